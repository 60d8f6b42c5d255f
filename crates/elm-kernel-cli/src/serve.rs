//! Serve command implementation.
//!
//! Starts the WebSocket kernel server.

use elm_kernel_core::KernelConfig;
use elm_kernel_server::ServerConfig;

use crate::colors;

/// Start the kernel server.
pub async fn execute(host: String, port: u16, kernel: KernelConfig) -> anyhow::Result<()> {
    if !kernel.project_dir().is_dir() {
        anyhow::bail!("Project directory not found: {}", kernel.project_dir().display());
    }

    let config = ServerConfig { host, port, kernel };

    println!("\n{}Elm Kernel{} - Notebook Server", colors::BOLD, colors::RESET);
    println!("{}", "─".repeat(50));
    println!(
        "{}  ◆ Compiler:{} {}",
        colors::CYAN,
        colors::RESET,
        config.kernel.compiler.display()
    );
    println!(
        "{}  ◆ Manifest:{} {}",
        colors::CYAN,
        colors::RESET,
        config.kernel.manifest_path().display()
    );
    println!(
        "{}  ◆ WebSocket:{} ws://{}:{}/ws",
        colors::CYAN,
        colors::RESET,
        config.host,
        config.port
    );
    println!("{}", "─".repeat(50));
    println!("{}Press Ctrl+C to stop{}", colors::GREEN, colors::RESET);
    println!();

    elm_kernel_server::serve(config).await?;

    Ok(())
}
