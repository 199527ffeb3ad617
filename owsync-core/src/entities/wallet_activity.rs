use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// Last time a user referenced a wallet in an ingestion batch.
///
/// Exactly one row per (user, wallet) pair; the timestamp advances on every
/// ingestion that touches the wallet, whether or not the wallet was newly
/// created.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WalletActivityRecord {
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    pub last_used: time::PrimitiveDateTime,
}

#[derive(Debug, Clone)]
/// Upsert the (user, wallet) activity row to "now".
pub struct UpsertWalletActivity {
    pub user_id: Uuid,
    pub wallet_id: Uuid,
}

impl Processor<UpsertWalletActivity> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertWalletActivity")]
    async fn process(&self, cmd: UpsertWalletActivity) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO wallet_activity (user_id, wallet_id, last_used) \
             VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id, wallet_id) DO UPDATE SET last_used = NOW()",
        )
        .bind(cmd.user_id)
        .bind(cmd.wallet_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
