use colored::Colorize;
use junpanel_container::{ActionDispatcher, ContainerAction, ContainerError, RuntimeClient};
use std::sync::Arc;

pub async fn handle(
    runtime: Arc<RuntimeClient>,
    container: &str,
    action: &str,
) -> anyhow::Result<()> {
    // 操作名の検証は Docker への接続より先に行う
    let action: ContainerAction = action.parse()?;

    println!(
        "{}",
        format!("コンテナ '{}' を{}中...", container, action.display_name()).yellow()
    );

    match ActionDispatcher::new(runtime).dispatch(container, action).await {
        Ok(()) => {
            println!();
            println!(
                "{}",
                format!("✓ '{}' の{}に成功しました", container, action.display_name())
                    .green()
                    .bold()
            );
            Ok(())
        }
        Err(ContainerError::ActionFailed { reason, .. }) => {
            println!();
            println!("{}", format!("✗ 操作 {} に失敗しました", action).red().bold());
            println!("  {}", reason.dimmed());
            Err(anyhow::anyhow!("操作 {} に失敗しました", action))
        }
        Err(e) => Err(e.into()),
    }
}
