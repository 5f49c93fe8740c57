use clap::Parser;
use park_watch::domain::ports::Notifier;
use park_watch::utils::error::ErrorSeverity;
use park_watch::utils::logger;
use park_watch::{build_acquirer, run_invocation, CliArgs, ConsoleNotifier, SmtpNotifier};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_scheduled_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting park-watch");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let settings = match args.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_code(e.severity()));
        }
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the message will be printed, not sent");
    }
    let dry_run = args.dry_run;

    let result = run_invocation(
        &settings,
        |key| std::env::var(key).ok(),
        build_acquirer,
        |mail, settings| -> Box<dyn Notifier> {
            if dry_run {
                Box::new(ConsoleNotifier)
            } else {
                Box::new(SmtpNotifier::new(mail, &settings.notify))
            }
        },
    )
    .await;

    match result {
        Ok(report) => {
            tracing::info!(
                "✅ Run completed: {:?} ({} sites, notified: {})",
                report.classification,
                report.availability.sites(),
                report.notified
            );
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(exit_code(e.severity()));
        }
    }

    Ok(())
}

/// 根據錯誤嚴重程度決定退出碼，讓排程器看到失敗
fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,   // 已寄出錯誤報告
        ErrorSeverity::High => 1,     // 通知失敗
        ErrorSeverity::Critical => 3, // 配置錯誤，未寄信
    }
}
