use crate::entities::WalletOwner;
use crate::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One durable wallet row.
///
/// Identity is the unique (address, provider, blockchain) triple; a wallet
/// is created at most once per triple and later sightings resolve to the
/// existing row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WalletRecord {
    pub id: Uuid,
    pub address: String,
    pub provider: CompactString,
    /// Chain registry key ("ethereum", "bsc", …).
    pub blockchain: CompactString,
    /// Native balance in human units.
    pub balance: Decimal,
    pub user_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub provider_image: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

/// Data for inserting a new wallet.
#[derive(Debug, Clone)]
pub struct WalletInsert {
    pub address: String,
    pub provider: CompactString,
    pub blockchain: CompactString,
    pub balance: Decimal,
    pub owner: WalletOwner,
    pub provider_image: Option<String>,
}

const WALLET_COLUMNS: &str = "id, address, provider, blockchain, balance, \
    user_id, company_id, provider_image, created_at, updated_at";

#[derive(Debug, Clone)]
/// Look up a wallet by its unique identity triple.
pub struct FindWalletByIdentity {
    pub address: String,
    pub provider: CompactString,
    pub blockchain: CompactString,
}

impl Processor<FindWalletByIdentity> for DatabaseProcessor {
    type Output = Option<WalletRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:FindWalletByIdentity")]
    async fn process(
        &self,
        query: FindWalletByIdentity,
    ) -> Result<Option<WalletRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT {WALLET_COLUMNS} FROM wallets \
             WHERE address = $1 AND provider = $2 AND blockchain = $3"
        );
        sqlx::query_as::<_, WalletRecord>(&sql)
            .bind(query.address)
            .bind(query.provider.as_str())
            .bind(query.blockchain.as_str())
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Insert a wallet unless its identity triple already exists.
///
/// Uses ON CONFLICT DO NOTHING so a race between two workers creating the
/// "same" wallet resolves to exactly one durable row; the loser sees `None`
/// and falls over into the find-existing path.
pub struct InsertWalletIfAbsent {
    pub wallet: WalletInsert,
}

impl Processor<InsertWalletIfAbsent> for DatabaseProcessor {
    type Output = Option<WalletRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertWalletIfAbsent")]
    async fn process(
        &self,
        insert: InsertWalletIfAbsent,
    ) -> Result<Option<WalletRecord>, sqlx::Error> {
        let wallet = insert.wallet;
        let sql = format!(
            "INSERT INTO wallets \
             (id, address, provider, blockchain, balance, user_id, company_id, provider_image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (address, provider, blockchain) DO NOTHING \
             RETURNING {WALLET_COLUMNS}"
        );
        sqlx::query_as::<_, WalletRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(wallet.address)
            .bind(wallet.provider.as_str())
            .bind(wallet.blockchain.as_str())
            .bind(wallet.balance)
            .bind(wallet.owner.user_id())
            .bind(wallet.owner.company_id())
            .bind(wallet.provider_image)
            .fetch_optional(&self.pool)
            .await
    }
}

#[derive(Debug, Clone)]
/// Refresh the stored native balance and bump `updated_at`.
pub struct UpdateWalletBalance {
    pub wallet_id: Uuid,
    pub balance: Decimal,
}

impl Processor<UpdateWalletBalance> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateWalletBalance")]
    async fn process(&self, cmd: UpdateWalletBalance) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wallets SET balance = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(cmd.wallet_id)
        .bind(cmd.balance)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// All wallets attached to one user or company.
pub struct GetWalletsForOwner {
    pub owner: WalletOwner,
}

impl Processor<GetWalletsForOwner> for DatabaseProcessor {
    type Output = Vec<WalletRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetWalletsForOwner")]
    async fn process(&self, query: GetWalletsForOwner) -> Result<Vec<WalletRecord>, sqlx::Error> {
        let (column, id) = match query.owner {
            WalletOwner::User(id) => ("user_id", id),
            WalletOwner::Company(id) => ("company_id", id),
        };
        let sql = format!(
            "SELECT {WALLET_COLUMNS} FROM wallets \
             WHERE {column} = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, WalletRecord>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
    }
}
