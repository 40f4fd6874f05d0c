use std::io::Write;

/// 使用默认等级 (Info) 初始化日志，`RUST_LOG` 环境变量可以覆盖
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

/// 初始化 env_logger，带颜色、时间戳以及源码位置
///
/// 重复调用是安全的：第二次之后的初始化会被忽略。
pub fn init_log_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .format(|buf, record| {
            let info_style = buf
                .default_level_style(log::Level::Info)
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green)));
            let level_style = match record.level() {
                log::Level::Info => info_style,
                log::Level::Warn => {
                    buf.default_level_style(log::Level::Warn).fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow)))
                }
                log::Level::Error => {
                    buf.default_level_style(log::Level::Error).fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)))
                }
                _ => buf.default_level_style(record.level()),
            };
            let grey_style = info_style.fg_color(Some(anstyle::Color::Rgb(anstyle::RgbColor(110, 110, 110))));

            let line = record.line().unwrap_or(!0);
            // windows 与 unix 的路径分隔符都要处理
            let file = record.file().unwrap_or("").rsplit(['/', '\\']).next().unwrap_or("");
            let time = chrono::Local::now().format("%H:%M:%S%.3f");
            let level = record.level();

            writeln!(
                buf,
                "{level_style}[{time}] {level:<5}{level_style:#} {grey_style}[{file}:{line}]{grey_style:#} {}",
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .try_init();
}
