use colored::Colorize;
use junpanel_config::PanelConfig;
use junpanel_health::HealthProbeCoordinator;

pub async fn handle(
    config: &PanelConfig,
    urls: &[String],
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let timeout = timeout.unwrap_or(config.health.default_timeout_secs);
    println!(
        "{}",
        format!("{} 件のサービスを確認中 (timeout {}s)...", urls.len(), timeout).blue()
    );

    let report = HealthProbeCoordinator::new()
        .with_max_concurrency(config.health.max_concurrency)
        .check(urls, timeout)
        .await;

    println!();
    for result in &report.results {
        if result.is_online {
            let code = result.status_code.map(|c| c.to_string()).unwrap_or_default();
            let elapsed = result
                .response_time_ms
                .map(|ms| format!("{:.2}ms", ms))
                .unwrap_or_default();
            println!(
                "  {} {} {} {}",
                "●".green(),
                result.url.cyan(),
                code,
                elapsed.dimmed()
            );
        } else {
            println!(
                "  {} {} {}",
                "●".red(),
                result.url.cyan(),
                result.error.as_deref().unwrap_or_default().red()
            );
        }
    }

    let online = report.results.iter().filter(|r| r.is_online).count();
    println!();
    println!(
        "{}",
        format!(
            "{}/{} オンライン ({})",
            online,
            report.results.len(),
            report.checked_at.to_rfc3339()
        )
        .dimmed()
    );

    Ok(())
}
