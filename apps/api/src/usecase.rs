//! # ユースケース
//!
//! ハンドラから呼ばれ、セッション上でリポジトリを操作して結果をエンベロープに包む。
//! トランザクションの境界はユースケースが決める。

pub mod meeting;

pub use meeting::{MeetingDto, MeetingUseCaseImpl};
