mod logging;
mod prompt;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use sentinel_client::api::models::{AuditEventType, AuditQuery, DEFAULT_AUDIT_LIMIT};
use sentinel_client::views::audit::{csv_file_name, REPORT_FILE_NAME};
use sentinel_client::views::overview;
use sentinel_client::{paths, Config, Dashboard, Level, Notification, Notifier, Role};

#[derive(Parser)]
#[command(name = "sentinel-cli")]
#[command(about = "Terminal front end for the IoT Sentinel security dashboard")]
#[command(version)]
struct Cli {
    /// Backend base URL, including the `/api` prefix
    #[arg(long, env = "SENTINEL_API_BASE", global = true)]
    api_base: Option<String>,

    /// Directory holding the persisted token and config.toml
    #[arg(long, env = "SENTINEL_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug mode
    #[arg(long, short, default_value = "false", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session token
    Login {
        username: String,
        #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// Create an account without logging in
    Register {
        username: String,
        #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, default_value = "observer")]
        role: Role,
    },
    /// Network summary and current alerts
    Status,
    /// Follow the alert banner until interrupted
    Watch,
    /// Inspect and manage network devices
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },
    /// Control the network scanner
    Scan {
        #[command(subcommand)]
        action: ScanAction,
    },
    /// Query the audit trail
    Audit {
        #[arg(long, default_value_t = DEFAULT_AUDIT_LIMIT)]
        limit: u32,
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        event_type: Option<AuditEventType>,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Days back from today when no range is given
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Export the result as CSV
        #[arg(long)]
        csv: Option<Option<PathBuf>>,
        /// Have the backend render the result as PDF
        #[arg(long)]
        pdf: Option<Option<PathBuf>>,
    },
    /// Check a URL with the backend classifier
    AnalyzeUrl { url: String },
    /// Check email content for phishing; reads stdin when no text is given
    AnalyzeEmail { text: Option<String> },
    /// Security analysis history (admin only)
    Reports,
    /// Manage user accounts (admin only)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Landing page demo widgets
    Overview,
}

#[derive(Subcommand)]
enum DeviceAction {
    List,
    Authorize { mac: String },
    Revoke { mac: String },
    Rename { mac: String, name: String },
}

#[derive(Subcommand)]
enum ScanAction {
    Start,
    Stop,
    Toggle,
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Add {
        username: String,
        #[arg(long, env = "SENTINEL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, default_value = "observer")]
        role: Role,
    },
    Delete { username: String },
}

/// Prints notifications to stderr as they arrive.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let line = match notification.level {
            Level::Success => format!("✅ {}", notification.message).green(),
            Level::Info => format!("ℹ️  {}", notification.message).cyan(),
            Level::Warning => format!("⚠️  {}", notification.message).yellow(),
            Level::Error => format!("❌ {}", notification.message).red(),
        };
        eprintln!("{line}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = Config::load(cli.data_dir.clone());
    if let Some(api_base) = cli.api_base.clone() {
        config.api_base = api_base;
    }
    log::debug!("Using backend {} and data dir {}", config.api_base, config.data_dir().display());

    paths::ensure_dir(&config.data_dir())?;
    let mut dashboard = Dashboard::from_config(&config, Arc::new(TerminalNotifier))?;
    let ok = run(&cli, &mut dashboard).await?;
    dashboard.stop_polling().await;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(cli: &Cli, dashboard: &mut Dashboard) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Login { username, password } => {
            let password = prompt::read_password(password.clone())?;
            Ok(dashboard.login(username, &password).await)
        }
        Commands::Register {
            username,
            password,
            role,
        } => {
            let password = prompt::read_password(password.clone())?;
            Ok(dashboard.sessions().register(username, &password, *role).await)
        }
        Commands::Logout => {
            dashboard.logout().await;
            Ok(true)
        }
        Commands::Overview => {
            print_overview(cli.json)?;
            Ok(true)
        }
        Commands::Watch => {
            if !dashboard.bootstrap().await {
                return Ok(not_logged_in());
            }
            watch(dashboard).await;
            Ok(true)
        }
        command => {
            if dashboard.sessions().restore().await.is_none() {
                return Ok(not_logged_in());
            }
            run_authenticated(command, cli.json, dashboard).await
        }
    }
}

async fn run_authenticated(command: &Commands, json: bool, dashboard: &Dashboard) -> anyhow::Result<bool> {
    match command {
        Commands::Whoami => {
            let Some(identity) = dashboard.sessions().identity().await else {
                return Ok(not_logged_in());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                println!(
                    "{} ({})",
                    identity.display_name().bold(),
                    identity.role.label().cyan()
                );
            }
            Ok(true)
        }
        Commands::Status => {
            let monitor = dashboard.network_monitor();
            let ok = monitor.fetch_status().await;
            let status = monitor.snapshot().await.status;
            let alerts = dashboard.alerts().refresh_status().await;
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "network": status, "alerts": alerts })
                );
                return Ok(ok);
            }
            let secure = if status.secure {
                "secure".green()
            } else {
                "at risk".red()
            };
            println!("Network:       {secure}");
            println!("Connected:     {}", status.connected_devices);
            println!("Unauthorized:  {}", status.unauthorized_devices);
            println!("Scanning:      {}", if alerts.scanning { "yes" } else { "no" });
            if let Some(banner) = alerts.banner() {
                println!("{}", format!("🚨 {banner}").red().bold());
            }
            Ok(ok)
        }
        Commands::Devices { action } => {
            let monitor = dashboard.network_monitor();
            match action {
                DeviceAction::List => {
                    if !monitor.fetch_devices().await {
                        return Ok(false);
                    }
                    let devices = monitor.snapshot().await.devices;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&devices)?);
                        return Ok(true);
                    }
                    println!(
                        "{}",
                        format!("{:<18} {:<16} {:<24} {:<12} {}", "MAC", "IP", "NAME", "STATUS", "LAST SEEN").bold()
                    );
                    for device in &devices {
                        let status = if device.authorized {
                            format!("{:<12}", "authorized").green()
                        } else {
                            format!("{:<12}", "unauthorized").red()
                        };
                        println!(
                            "{:<18} {:<16} {:<24} {} {}",
                            device.mac,
                            device.ip,
                            device.label(),
                            status,
                            device.last_seen.format("%Y-%m-%d %H:%M:%S")
                        );
                    }
                    Ok(true)
                }
                DeviceAction::Authorize { mac } => Ok(monitor.set_authorization(mac, true).await),
                DeviceAction::Revoke { mac } => Ok(monitor.set_authorization(mac, false).await),
                DeviceAction::Rename { mac, name } => Ok(monitor.rename_device(mac, name).await),
            }
        }
        Commands::Scan { action } => {
            let scanning = dashboard.alerts().refresh_status().await.scanning;
            let wanted = match action {
                ScanAction::Start => true,
                ScanAction::Stop => false,
                ScanAction::Toggle => !scanning,
            };
            if wanted == scanning {
                let state = if scanning { "already running" } else { "not running" };
                dashboard.notifier().info(&format!("Scan {state}"));
                return Ok(true);
            }
            Ok(dashboard.network_monitor().toggle_scan().await)
        }
        Commands::Audit {
            limit,
            mac,
            event_type,
            from,
            to,
            days,
            csv,
            pdf,
        } => {
            let mut query = if from.is_none() && to.is_none() {
                AuditQuery::last_days(*days)?
            } else {
                AuditQuery {
                    start_date: *from,
                    end_date: *to,
                    ..AuditQuery::default()
                }
            };
            query.limit = *limit;
            query.device_mac = mac.clone();
            query.event_type = *event_type;

            let trail = dashboard.audit_trail();
            let Some(logs) = trail.fetch(query).await else {
                return Ok(false);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&logs)?);
            } else {
                for entry in &logs {
                    println!(
                        "{} {:<12} {:<18} {:<16} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                        entry.event_type.cyan(),
                        entry.device_mac,
                        entry.ip_address.as_deref().unwrap_or("N/A"),
                        entry.details.as_deref().unwrap_or("")
                    );
                }
                println!("{}", format!("{} entries", logs.len()).dimmed());
            }

            let mut ok = true;
            if let Some(target) = csv {
                let path = target
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(csv_file_name(chrono::Local::now().date_naive())));
                let file = std::fs::File::create(&path)?;
                ok &= trail.export_csv(io::BufWriter::new(file)).await;
                if ok {
                    println!("{}", format!("📄 {}", path.display()).green());
                }
            }
            if let Some(target) = pdf {
                let path = target.clone().unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME));
                match trail.download_report().await {
                    Some(bytes) => {
                        std::fs::write(&path, &bytes)?;
                        println!("{}", format!("📄 {}", path.display()).green());
                    }
                    None => ok = false,
                }
            }
            Ok(ok)
        }
        Commands::AnalyzeUrl { url } => {
            let Some(analysis) = dashboard.security_tools().analyze_url(url).await else {
                return Ok(false);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("Confidence: {:.1}%", analysis.confidence * 100.0);
                if let Some(reason) = &analysis.reason {
                    println!("Reason:     {reason}");
                }
            }
            Ok(true)
        }
        Commands::AnalyzeEmail { text } => {
            let text = match text {
                Some(text) => text.clone(),
                None => io::read_to_string(io::stdin())?,
            };
            let Some(analysis) = dashboard.security_tools().analyze_email(&text).await else {
                return Ok(false);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("Confidence: {:.1}%", analysis.confidence * 100.0);
                for reason in analysis.reasons.iter().flatten() {
                    println!("  • {reason}");
                }
            }
            Ok(true)
        }
        Commands::Reports => {
            let Some(reports) = dashboard.security_tools().reports().await else {
                return Ok(false);
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
                return Ok(true);
            }
            for report in &reports {
                println!(
                    "{} {:<6} {:<12} {:<10} {:>5.1}%  {}",
                    report.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    report.tool.cyan(),
                    report.user,
                    report.result,
                    report.confidence * 100.0,
                    report.input_data
                );
            }
            Ok(true)
        }
        Commands::Users { action } => {
            let admin = dashboard.user_admin();
            match action {
                UserAction::List => {
                    let Some(users) = admin.list().await else {
                        return Ok(false);
                    };
                    if json {
                        println!("{}", serde_json::to_string_pretty(&users)?);
                    } else {
                        for user in &users {
                            println!("{:<24} {}", user.username, user.role.label().cyan());
                        }
                    }
                    Ok(true)
                }
                UserAction::Add {
                    username,
                    password,
                    role,
                } => {
                    let password = prompt::read_password(password.clone())?;
                    Ok(admin.create(username, &password, *role).await)
                }
                UserAction::Delete { username } => Ok(admin.delete(username).await),
            }
        }
        Commands::Login { .. }
        | Commands::Logout
        | Commands::Register { .. }
        | Commands::Overview
        | Commands::Watch => {
            unreachable!("handled before session restore")
        }
    }
}

async fn watch(dashboard: &Dashboard) {
    let mut rx = dashboard.alerts().subscribe();
    println!("{}", "👀 Watching alerts, Ctrl-C to stop".cyan());
    loop {
        let state = *rx.borrow_and_update();
        match state.banner() {
            Some(banner) => println!(
                "{} {}",
                chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                format!("🚨 {banner}").red().bold()
            ),
            None => println!(
                "{} {}",
                chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                "All clear".green()
            ),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    println!("{}", "👋 Stopped watching".cyan());
}

fn print_overview(json: bool) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "attack_stats": overview::attack_stats(),
                "attack_shares": overview::attack_shares(),
                "recent_events": overview::recent_events(),
                "device_status": overview::device_status(),
            }))?
        );
        return Ok(());
    }

    println!("{}", "Attack statistics (demo data)".bold());
    for ((name, share), stat) in overview::attack_shares().iter().zip(overview::attack_stats()) {
        println!("  {:<16} {:>3}  {:>3}%", name, stat.count, share);
    }
    println!();
    println!("{}", "Recent events".bold());
    for event in overview::recent_events() {
        let title = match event.outcome {
            overview::EventOutcome::Success => event.title.green(),
            overview::EventOutcome::Warning => event.title.yellow(),
            overview::EventOutcome::Error => event.title.red(),
        };
        println!("  {} {}", event.timestamp.dimmed(), title);
        println!("    {}", event.description);
    }
    println!();
    println!("{}", "Device status".bold());
    for device in overview::device_status() {
        let state = if device.online {
            "online".green()
        } else {
            "offline".red()
        };
        println!("  {:<28} {:<16} {}", device.name, device.ip, state);
    }
    Ok(())
}

fn not_logged_in() -> bool {
    eprintln!("{}", "❌ Not logged in. Run `sentinel-cli login <username>` first.".red());
    false
}
