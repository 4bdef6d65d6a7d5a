//! 終端機自動對戰
//!
//! 雙方都交給 AI，逐回合印出事件與棋盤，最後印出結果。
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tactics_core::{FileStorage, GameConfig, GameController, MemoryStorage, Phase, Storage};

#[derive(Parser, Debug)]
#[command(name = "tactics")]
#[command(about = "回合制戰棋：AI 對 AI 自動對戰")]
struct Args {
    /// 遊戲設定檔（TOML），省略時使用預設值
    #[arg(long)]
    config: Option<PathBuf>,

    /// 亂數種子
    #[arg(long)]
    seed: Option<u64>,

    /// 存檔目錄；指定時結束後存檔
    #[arg(long)]
    save: Option<PathBuf>,

    /// 開始前先讀取存檔目錄中的進度
    #[arg(long, requires = "save")]
    load: bool,

    /// 最多進行幾個回合
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// 每回合印出棋盤
    #[arg(long, short = 'b')]
    board: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("無法讀取設定檔 {}", path.display()))?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting");

    match args.save.clone() {
        Some(dir) => {
            let controller = GameController::with_seed(config, FileStorage::new(dir), seed)?;
            run(controller, &args)
        }
        None => {
            let controller = GameController::with_seed(config, MemoryStorage::new(), seed)?;
            run(controller, &args)
        }
    }
}

fn run<S: Storage>(mut controller: GameController<S>, args: &Args) -> Result<()> {
    let mut events = controller.init();
    if args.load {
        events.extend(controller.load_game());
    }
    render::print_events(&events);

    for turn in 1..=args.max_turns {
        if !controller.is_playing() {
            break;
        }
        println!("── 回合 {turn} ──");
        let events = controller.autoplay_turn();
        render::print_events(&events);
        if args.board {
            println!("{}", render::board(controller.state(), controller.board()));
        }
    }

    let state = controller.state();
    match controller.phase() {
        Phase::Over(outcome) => println!("結果：{outcome}，分數 {}", state.score),
        Phase::Playing => println!(
            "達到回合上限，停在第 {} 關，分數 {}",
            state.current_level, state.score
        ),
    }
    println!("最高分：{}", state.max_score);

    if args.save.is_some() {
        render::print_events(&controller.save_game());
    }
    Ok(())
}
