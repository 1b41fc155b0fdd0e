use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "reference-validator")]
#[command(about = "参考文献検証ツール（バックエンド起動＋ウィンドウ表示）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// サーバーのホスト
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// サーバーのポート
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// 起動確認の最大試行回数
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// バックエンドを起動せず、既存サーバーに接続するだけ
    #[arg(long, global = true)]
    pub attach_only: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// バックエンドを起動してウィンドウを開く（デフォルト）
    Launch,

    /// バックエンドが応答するか確認（起動はしない）
    Probe,

    /// 設定を表示/保存
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// コマンドライン指定を設定ファイルに保存
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    /// コマンドライン指定で設定を上書き
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
    }
}
