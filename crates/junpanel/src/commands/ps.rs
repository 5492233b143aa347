use colored::Colorize;
use junpanel_container::{ContainerInspector, ContainerRecord, ContainerState, RuntimeClient};
use std::sync::Arc;

pub async fn handle(runtime: Arc<RuntimeClient>, all: bool) -> anyhow::Result<()> {
    println!("{}", "コンテナ一覧を取得中...".blue());

    if !runtime.is_available().await {
        return Err(anyhow::anyhow!("Docker サービスが利用できません"));
    }

    let containers = ContainerInspector::new(runtime).list(all).await;

    println!();
    if containers.is_empty() {
        println!("{}", empty_message(all).dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<14} {:<20} {:<12} {:<25} {:<30}",
            "ID", "NAME", "STATE", "IMAGE", "PORTS"
        )
        .bold()
    );
    println!("{}", "─".repeat(105).dimmed());

    for container in &containers {
        let state = format!("{:<12}", container.state.as_str());
        let state_colored = match container.state {
            ContainerState::Running => state.green(),
            ContainerState::Paused | ContainerState::Restarting => state.yellow(),
            _ => state.red(),
        };

        println!(
            "{:<14} {:<20} {} {:<25} {:<30}",
            container.id,
            container.name.cyan(),
            state_colored,
            container.image,
            format_ports(container).dimmed()
        );
    }

    Ok(())
}

fn empty_message(all: bool) -> &'static str {
    if all {
        "コンテナはありません"
    } else {
        "実行中のコンテナはありません"
    }
}

/// "8080->80/tcp" 形式でポートを並べる
fn format_ports(container: &ContainerRecord) -> String {
    container
        .ports
        .iter()
        .flat_map(|(spec, hosts)| hosts.iter().map(move |host| format!("{}->{}", host, spec)))
        .collect::<Vec<_>>()
        .join(", ")
}
