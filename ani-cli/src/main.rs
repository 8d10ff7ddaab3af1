//! # ani-sim
//!
//! 属性过渡模拟器 - 在无界面的控件上逐帧运行动画，并打印每一帧的属性值。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p ani-cli
//! cargo run -p ani-cli -- --attr width --goal 300
//! cargo run -p ani-cli -- --attr pos --from 0,0 --goal 120,-40 --json
//! cargo run -p ani-cli -- --attr size --goal 10,10 --in-place
//! cargo run -p ani-cli -- --config ani.json -vv
//! cargo run -p ani-cli -- init-config ani.json
//! ```

use std::path::{Path, PathBuf};
use std::rc::Rc;

use ani_property::{
    AniConfig, AniMutableSequenceProperty, AnimationManager, AnimatorKind, AttrValue, ClassDef,
    Descriptor, FrameClock, Widget, add_property, install_with_config,
};
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "ani-sim")]
#[command(about = "属性过渡模拟器 - 在无界面的控件上逐帧运行动画")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 要动画的真实属性（默认：x）
    #[arg(short, long, default_value = "x")]
    attr: String,

    /// 目标值，序列分量用逗号分隔（默认：100）
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, default_values_t = [100.0])]
    goal: Vec<f64>,

    /// 动画开始前写入的初始值
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    from: Option<Vec<f64>>,

    /// 每帧时长（秒）
    #[arg(long, default_value_t = 0.05)]
    dt: f64,

    /// 配置文件 (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 使用原地修改的序列描述符
    #[arg(long)]
    in_place: bool,

    /// 最多运行的帧数
    #[arg(long, default_value_t = 1000)]
    max_frames: u64,

    /// 以 JSON Lines 输出每一帧
    #[arg(long)]
    json: bool,

    /// 日志详细程度（-v / -vv / -vvv）
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 写出默认配置文件
    InitConfig {
        /// 输出路径
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Some(Commands::InitConfig { path }) => init_config(path),
        None => simulate(&cli),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// 写出默认配置
fn init_config(path: &Path) -> Result<()> {
    AniConfig::default()
        .save(path)
        .with_context(|| format!("无法写入配置文件: {}", path.display()))?;
    println!("✅ 默认配置已写入: {}", path.display());
    Ok(())
}

/// 按描述符类型把命令行数值转换为属性值
fn to_value(values: &[f64], kind: AnimatorKind) -> Result<AttrValue> {
    match (kind, values) {
        (AnimatorKind::Numeric, [value]) => Ok(AttrValue::Number(*value)),
        (AnimatorKind::Numeric, _) => bail!("标量属性只接受一个数值，实际为 {}", values.len()),
        (AnimatorKind::MutableSequence, _) => Ok(AttrValue::list(values.to_vec())),
        (AnimatorKind::Sequence, _) => Ok(AttrValue::tuple(values.to_vec())),
    }
}

fn value_json(value: &AttrValue) -> serde_json::Value {
    match value.components() {
        Some(components) => json!(components),
        None => json!(value.as_number()),
    }
}

fn print_frame(as_json: bool, frame: u64, value: &AttrValue) {
    if as_json {
        println!("{}", json!({ "frame": frame, "value": value_json(value) }));
    } else {
        println!("{frame:>5}  {value}");
    }
}

/// 构造控件类并安装动画属性
fn build_class(config: &AniConfig, goal_attr: &str, in_place: bool) -> Result<ClassDef> {
    let mut class = ClassDef::widget();
    install_with_config(&mut class, config)?;
    if in_place {
        add_property(
            &mut class,
            goal_attr,
            AniMutableSequenceProperty::from_config(config),
        )?;
    }
    Ok(class)
}

fn simulate(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AniConfig::load(path),
        None => AniConfig::default(),
    };
    config.validate()?;

    let goal_attr = format!("{}{}", config.install_prefix, cli.attr);
    let class = build_class(&config, &goal_attr, cli.in_place)?;
    let kind = class
        .descriptor(&goal_attr)
        .map(Descriptor::kind)
        .with_context(|| {
            format!(
                "属性 '{}' 没有对应的动画描述符（可用: {}）",
                cli.attr,
                class.attrs().join(", ")
            )
        })?;

    let mut manager = AnimationManager::new(FrameClock::new());
    let clock = manager.clock().clone();
    let widget = Rc::new(Widget::new());
    let id = manager.register(Rc::clone(&widget), Rc::new(class));

    if let Some(from) = &cli.from {
        manager.set_attr(id, &cli.attr, to_value(from, kind)?)?;
    }
    let goal = to_value(&cli.goal, kind)?;
    info!(attr = %cli.attr, goal = %goal, kind = ?kind, dt = cli.dt, "开始模拟");
    manager.set_attr(id, &goal_attr, goal)?;

    print_frame(cli.json, 0, &manager.get_attr(id, &cli.attr)?);
    while !clock.is_idle() {
        if clock.frame() >= cli.max_frames {
            bail!("动画没有在 {} 帧内结束", cli.max_frames);
        }
        clock.tick(cli.dt);
        print_frame(cli.json, clock.frame(), &manager.get_attr(id, &cli.attr)?);
    }

    info!(frames = clock.frame(), "模拟完成");
    if !cli.json {
        println!();
        println!("✅ 共 {} 帧，耗时 {:.3} 秒", clock.frame(), clock.frame() as f64 * cli.dt);
        println!("   最终值: {}", manager.get_attr(id, &cli.attr)?);
    }
    Ok(())
}
