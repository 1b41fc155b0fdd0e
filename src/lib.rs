//! 参考文献検証ツールのデスクトップランチャー
//!
//! ローカルのバックエンドを起動（または既存のものに接続）し、
//! 応答を確認してからウィンドウに読み込む。

pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod paths;
pub mod supervisor;
pub mod window;
