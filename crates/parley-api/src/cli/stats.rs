//! `parley stats`: one-shot chat and message totals.

use anyhow::Result;
use parley_core::lifecycle::metrics::collect_snapshot;

use crate::settings::Settings;
use crate::state::AppState;

/// Count chats and messages and print them.
pub async fn stats(settings: &Settings, json: bool) -> Result<()> {
    let (state, _) = AppState::init(settings).await?;
    let snapshot = collect_snapshot(
        state.chat_service.chat_repo(),
        state.chat_service.message_repo(),
    )
    .await?;
    state.db_pool.close().await;

    if json {
        let body = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "chats_total": snapshot.chats_total,
            "messages_total": snapshot.messages_total,
            "collected_at": snapshot.collected_at,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    println!("  Parley v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("  Data dir:  {}", state.data_dir.display());
    println!("  Chats:     {}", snapshot.chats_total);
    println!("  Messages:  {}", snapshot.messages_total);
    println!();

    Ok(())
}
