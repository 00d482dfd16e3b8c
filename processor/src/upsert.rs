use gateway::{GatewayClient, GatewayError, has_rows};
use serde_json::json;

/// Ensure the tracked space row exists for this lot, then mark it occupied.
///
/// Three ordered statements, each a separate gateway call with no
/// transaction around them:
/// 1. existence check on `(lot_id, space_id)`
/// 2. insert with `status = 0` if no row matched
/// 3. unconditional update to `status = 1`
///
/// Any gateway failure aborts the remaining steps. A failure between the
/// insert and the update leaves the row at `status = 0`; re-invoking the
/// endpoint converges, since step 1 re-checks and step 3 is unconditional.
/// Returns the raw gateway payload of the update.
pub async fn ensure_occupied(
    gateway: &GatewayClient,
    space_id: &str,
    category: &str,
    lot_id: &str,
) -> Result<serde_json::Value, GatewayError> {
    let existing = gateway
        .query(
            "SELECT 1 FROM space WHERE lot_id = ? AND id = ? LIMIT 1;",
            &[json!(lot_id), json!(space_id)],
        )
        .await?;

    if !has_rows(&existing) {
        tracing::info!(lot_id, space_id, "creating missing space row");
        gateway
            .query(
                "INSERT INTO space (id, lot_id, category, status) VALUES (?, ?, ?, ?);",
                &[json!(space_id), json!(lot_id), json!(category), json!(0)],
            )
            .await?;
    }

    gateway
        .query(
            "UPDATE space SET status = 1 WHERE lot_id = ? AND id = ?;",
            &[json!(lot_id), json!(space_id)],
        )
        .await
}
