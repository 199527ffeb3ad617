use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One non-zero token balance inside a wallet.
///
/// Holdings are only written for balances strictly greater than zero and
/// are replaced as a set when a wallet refreshes.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TokenHoldingRecord {
    pub id: i64,
    pub wallet_id: Uuid,
    /// Token display name, e.g. "USD Coin".
    pub token_name: String,
    pub symbol: CompactString,
    /// Human-readable amount, already adjusted for token decimals.
    pub balance: Decimal,
    pub created_at: time::PrimitiveDateTime,
}

/// Data for inserting one holding.
#[derive(Debug, Clone)]
pub struct TokenHoldingInsert {
    pub wallet_id: Uuid,
    pub token_name: String,
    pub symbol: CompactString,
    pub balance: Decimal,
}

#[derive(Debug, Clone)]
/// Insert multiple holdings in a single query.
///
/// Uses QueryBuilder for a bulk insert; ON CONFLICT keeps the write
/// idempotent when the same (wallet, symbol) pair is raced, taking the
/// latest balance. Returns the number of rows written.
pub struct InsertTokenHoldings {
    pub holdings: Vec<TokenHoldingInsert>,
}

impl Processor<InsertTokenHoldings> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertTokenHoldings")]
    async fn process(&self, insert: InsertTokenHoldings) -> Result<u64, sqlx::Error> {
        if insert.holdings.is_empty() {
            return Ok(0);
        }

        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO token_holdings (wallet_id, token_name, symbol, balance) ",
        );

        query_builder.push_values(insert.holdings, |mut b, holding| {
            b.push_bind(holding.wallet_id)
                .push_bind(holding.token_name)
                .push_bind(holding.symbol.to_string())
                .push_bind(holding.balance);
        });

        query_builder.push(
            " ON CONFLICT (wallet_id, symbol) DO UPDATE SET balance = EXCLUDED.balance",
        );

        let result = query_builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// Drop all holdings of one wallet (the first half of a refresh).
pub struct DeleteWalletHoldings {
    pub wallet_id: Uuid,
}

impl Processor<DeleteWalletHoldings> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteWalletHoldings")]
    async fn process(&self, cmd: DeleteWalletHoldings) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM token_holdings WHERE wallet_id = $1")
            .bind(cmd.wallet_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// The current holding set of one wallet, ordered by symbol.
pub struct GetHoldingsForWallet {
    pub wallet_id: Uuid,
}

impl Processor<GetHoldingsForWallet> for DatabaseProcessor {
    type Output = Vec<TokenHoldingRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetHoldingsForWallet")]
    async fn process(
        &self,
        query: GetHoldingsForWallet,
    ) -> Result<Vec<TokenHoldingRecord>, sqlx::Error> {
        sqlx::query_as::<_, TokenHoldingRecord>(
            "SELECT id, wallet_id, token_name, symbol, balance, created_at \
             FROM token_holdings WHERE wallet_id = $1 ORDER BY symbol ASC",
        )
        .bind(query.wallet_id)
        .fetch_all(&self.pool)
        .await
    }
}
