//! Pofara 命令行客户端

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pofara_client::api::{InspectorsApi, ProjectsApi};
use pofara_client::models::auth::Credentials;
use pofara_client::{telemetry, ClientConfig, SessionManager};
use std::io::Write;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pofara", about = "Pofara platform API client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 登录并保存会话
    Login {
        /// 账号邮箱
        #[arg(long)]
        email: String,
    },
    /// 显示当前登录用户
    Whoami,
    /// 登出并清除本地令牌
    Logout,
    /// 列出当前用户可见的项目
    Projects,
    /// 列出监理目录
    Inspectors,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_telemetry(&config);

    let session = Arc::new(SessionManager::new(&config)?);
    let cli = Cli::parse();

    match cli.command {
        Command::Login { email } => {
            let password = prompt_password()?;
            let user = session.login(&Credentials::new(email, password)).await?;
            println!("Signed in as {} ({})", user.full_name(), user.email);
        }
        Command::Whoami => {
            let user = session
                .bootstrap()
                .await
                .context("No active session, run `pofara login`")?
                .context("No active session, run `pofara login`")?;
            println!("{} <{}>", user.full_name(), user.email);
            println!("role: {:?}, verified: {}", user.role, user.is_verified);
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Command::Projects => {
            require_session(&session).await?;
            let projects = ProjectsApi::new(session.clone()).list().await?;
            if projects.is_empty() {
                println!("No projects");
            }
            for project in projects {
                println!(
                    "{}  {}  [{}]  {} {}",
                    project.project_number,
                    project.title,
                    project.status,
                    project.total_budget,
                    project.budget_currency
                );
            }
        }
        Command::Inspectors => {
            require_session(&session).await?;
            let inspectors = InspectorsApi::new(session.clone()).list().await?;
            for inspector in inspectors {
                println!(
                    "{}  {} ({}, {})  level: {}",
                    inspector.id,
                    inspector.display_name,
                    inspector.city,
                    inspector.country,
                    inspector.verification_level
                );
            }
        }
    }

    Ok(())
}

/// 恢复持久化会话，没有会话时报错退出
async fn require_session(session: &SessionManager) -> Result<()> {
    let restored = session.bootstrap().await.context("Sign in first")?;
    if restored.is_none() {
        anyhow::bail!("No active session, run `pofara login`");
    }
    Ok(())
}

/// 从标准输入读取密码
fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("Failed to read password")?;

    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
