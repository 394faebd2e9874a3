use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings};

fn env_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    match "router_operator=debug".parse() {
        Ok(directive) if level >= Level::DEBUG => filter.add_directive(directive),
        _ => filter,
    }
}

/// 로깅 설정에 따라 전역 subscriber를 초기화합니다.
///
/// non-blocking writer의 guard를 반환하며, 호출자는 프로세스가 끝날 때까지 guard를 유지해야 합니다.
pub fn init_logging(settings: &LogSettings) -> WorkerGuard {
    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "router_operator.log".into());
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(settings.level))
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        // 테스트처럼 이미 subscriber가 설치된 경우
        eprintln!("로깅 초기화 건너뜀: {}", e);
    }

    guard
}
