use colored::Colorize;
use junpanel_container::RuntimeClient;

pub async fn handle(runtime: &RuntimeClient) -> anyhow::Result<()> {
    if runtime.is_available().await {
        println!("{}", "✓ Docker サービスは正常です".green().bold());
    } else {
        println!("{}", "✗ Docker サービスが利用できません".red().bold());
        println!();
        println!("{}", "解決方法:".yellow());
        println!("  • Dockerが起動しているか確認してください");
        println!("  • docker ps コマンドが正常に動作するか確認してください");
    }
    Ok(())
}
