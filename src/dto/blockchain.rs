use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::BlockchainTransaction;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub product_id: Uuid,
    pub action: String,
    pub from_address: String,
    pub to_address: String,
    /// Supplied by callers that already hold a hash; generated otherwise.
    pub blockchain_hash: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: BlockchainTransaction,
    pub product_name: Option<String>,
    pub product_sku: Option<String>,
    pub supplier_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionList {
    pub transactions: Vec<TransactionDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductTransactions {
    pub product: crate::dto::products::ProductRef,
    pub transactions: Vec<BlockchainTransaction>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    pub product_id: Option<Uuid>,
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedTransaction {
    pub hash: String,
    pub block_number: Option<i64>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedProduct {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifiedSupplier {
    pub name: String,
    pub verified: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationDetails {
    pub blockchain_verified: bool,
    pub supplier_verified: bool,
    pub authenticity_score: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub verified: bool,
    pub transaction: VerifiedTransaction,
    pub product: VerifiedProduct,
    pub supplier: VerifiedSupplier,
    pub verification_details: VerificationDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: i64,
    pub status: String,
    pub last_block: i64,
    pub average_block_time: String,
    pub gas_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractInfo {
    pub address: String,
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NetworkStatistics {
    pub total_transactions_24h: i64,
    pub confirmed_transactions_24h: i64,
    pub pending_transactions: i64,
    pub failed_transactions_24h: i64,
    pub average_gas_used: f64,
    pub products_on_chain: i64,
    pub success_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NetworkStatus {
    pub network: NetworkInfo,
    pub contract: ContractInfo,
    pub statistics: NetworkStatistics,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContractInteractRequest {
    pub method: String,
    #[schema(value_type = Option<Object>)]
    pub parameters: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractInteractResponse {
    pub method: String,
    #[schema(value_type = Object)]
    pub parameters: Value,
    pub transaction_hash: String,
    pub gas_estimate: i64,
    pub status: String,
    pub estimated_confirmation_time: String,
}
