//! Driver balances and the payment receipts settled against them.

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::constants::{
    ERR_BALANCE_NOT_FOUND, ERR_NO_OPEN_BALANCES, ERR_NO_SETTLEMENT_ITEMS,
    ERR_RECEIPT_ALREADY_VERIFIED, ERR_RECEIPT_NOT_FOUND,
};
use crate::errors::ApiError;
use crate::models::{
    allocate, BalanceDetail, BalanceListItem, BalanceListQuery, BalanceWithReceipts,
    BatchVerifyRequest, Claims, CreateReceiptRequest, GenerateBalanceQuery, GeneratedBalance,
    MatchPendingQuery, Pagination, PaginatedResponse, PayeeDetailsQuery, PayeeSummary,
    PayeeSummaryQuery, PaymentReceipt, ReceiptDetail, ReceiptListQuery, ReceiptStatus,
    ReceiptView, RecalculatedBalance, VerifyPaymentRequest, VerifyPaymentResult,
};
use crate::repositories::balance_repository::NewReceipt;
use crate::repositories::BalanceRepository;
use crate::services::file_service::{FileService, StoredImage};
use crate::utils::mask_name;
use crate::validators::keyword_tokens;

const DEFAULT_MATCH_DAYS: i64 = 7;

pub struct BalanceService {
    repository: BalanceRepository,
    files: FileService,
}

impl BalanceService {
    pub fn new(repository: BalanceRepository, files: FileService) -> Self {
        Self { repository, files }
    }

    pub async fn generate(
        &self,
        actor: &Claims,
        filter: GenerateBalanceQuery,
    ) -> Result<Vec<GeneratedBalance>, ApiError> {
        let generated = self.repository.generate(&filter).await?;
        info!("User {} generated {} balance rows", actor.sub, generated.len());
        Ok(generated)
    }

    pub async fn list(
        &self,
        query: BalanceListQuery,
    ) -> Result<PaginatedResponse<BalanceListItem>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let (items, total) = self.repository.list(&query, &tokens, pagination).await?;
        Ok(PaginatedResponse::new(items, total, pagination))
    }

    pub async fn get(&self, id: i64) -> Result<BalanceWithReceipts, ApiError> {
        let balance = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_BALANCE_NOT_FOUND.to_string()))?;
        let payment_receipts = self.repository.receipts_for_balance(id).await?;

        Ok(BalanceWithReceipts {
            payment_status_label: balance.payment_status_name(),
            balance,
            payment_receipts,
        })
    }

    pub async fn recalculate(&self, id: i64) -> Result<RecalculatedBalance, ApiError> {
        let result = self
            .repository
            .recalculate(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_BALANCE_NOT_FOUND.to_string()))?;
        info!("Balance {} recalculated: {} left", id, result.balance);
        Ok(result)
    }

    pub async fn match_pending(&self, query: MatchPendingQuery) -> Result<Vec<BalanceDetail>, ApiError> {
        let days = query.date_range.filter(|d| *d > 0).unwrap_or(DEFAULT_MATCH_DAYS);
        let found = self
            .repository
            .match_pending(&query.payee_name, query.amount, days)
            .await?;
        debug!(
            "{} pending balances match {} for {}",
            found.len(),
            query.amount,
            mask_name(&query.payee_name)
        );
        Ok(found)
    }

    pub async fn verify_payment(
        &self,
        actor: &Claims,
        req: VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResult, ApiError> {
        if req.items.is_empty() {
            return Err(ApiError::BadRequest(ERR_NO_SETTLEMENT_ITEMS.to_string()));
        }
        let items: Vec<(i64, Decimal)> = req.items.iter().map(|i| (i.balance_id, i.amount)).collect();

        let result = self.repository.settle(req.receipt_id, &items).await?;
        info!(
            "User {} settled {} against receipt {} over {} rows",
            actor.sub,
            result.total_settled,
            req.receipt_id,
            result.items.len()
        );
        Ok(result)
    }

    pub async fn payee_summary(&self, query: PayeeSummaryQuery) -> Result<Vec<PayeeSummary>, ApiError> {
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let min_balance = query.min_balance.unwrap_or_else(|| Decimal::new(1, 2));
        self.repository.payee_summary(&query, &tokens, min_balance).await
    }

    pub async fn payee_details(
        &self,
        payee_name: &str,
        query: PayeeDetailsQuery,
    ) -> Result<Vec<BalanceDetail>, ApiError> {
        self.repository.payee_details(payee_name, &query).await
    }

    /// Pays a payee's open balances from one receipt, oldest first.
    pub async fn batch_verify(
        &self,
        actor: &Claims,
        payee_name: &str,
        req: BatchVerifyRequest,
    ) -> Result<VerifyPaymentResult, ApiError> {
        let receipt = self.find_receipt(req.receipt_id).await?;
        if ReceiptStatus::from_i8(receipt.ocr_status) == Some(ReceiptStatus::Verified) {
            return Err(ApiError::BadRequest(ERR_RECEIPT_ALREADY_VERIFIED.to_string()));
        }

        let open = self
            .repository
            .open_balances(payee_name, req.driver_phone.as_deref())
            .await?;
        let items = allocate(receipt.amount, &open);
        if items.is_empty() {
            warn!("Batch verify: no open balances for {}", mask_name(payee_name));
            return Err(ApiError::BadRequest(ERR_NO_OPEN_BALANCES.to_string()));
        }

        let result = self.repository.settle(receipt.id, &items).await?;
        info!(
            "User {} batch-settled {} for {} from receipt {}",
            actor.sub,
            result.total_settled,
            mask_name(payee_name),
            receipt.id
        );
        Ok(result)
    }

    pub async fn create_receipt(
        &self,
        actor: &Claims,
        req: CreateReceiptRequest,
    ) -> Result<ReceiptView, ApiError> {
        let manual = req.is_manual.unwrap_or(true);
        let receipt = NewReceipt {
            receipt_no: req.receipt_no,
            receipt_image: req.receipt_image,
            payment_date: req.payment_date,
            payment_time: req.payment_time,
            payer_name: req.payer_name,
            payer_account: req.payer_account,
            payee_name: req.payee_name.trim().to_string(),
            payee_account: req.payee_account,
            amount: req.amount,
            bank_name: req.bank_name,
            remark: req.remark,
            ocr_status: if manual {
                ReceiptStatus::Confirmed
            } else {
                ReceiptStatus::Pending
            },
            is_manual_corrected: manual,
            ocr_raw_data: req.ocr_raw_data,
        };

        let id = self.repository.insert_receipt(&receipt).await?;
        info!("User {} recorded payment receipt {}", actor.sub, id);
        self.find_receipt(id).await.map(ReceiptView::from)
    }

    pub async fn list_receipts(
        &self,
        query: ReceiptListQuery,
    ) -> Result<PaginatedResponse<ReceiptView>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let (receipts, total) = self.repository.list_receipts(&query, &tokens, pagination).await?;
        let views = receipts.into_iter().map(ReceiptView::from).collect();
        Ok(PaginatedResponse::new(views, total, pagination))
    }

    pub async fn get_receipt(&self, id: i64) -> Result<ReceiptDetail, ApiError> {
        let receipt = self.find_receipt(id).await?;
        let settlements = self.repository.receipt_settlements(id).await?;
        Ok(ReceiptDetail {
            receipt: receipt.into(),
            settlements,
        })
    }

    /// Stores the photo of a bank receipt, replacing any earlier one.
    pub async fn attach_receipt_image(&self, id: i64, image: String) -> Result<ReceiptView, ApiError> {
        let previous = match self.find_receipt(id).await {
            Ok(receipt) => receipt.receipt_image,
            Err(e) => {
                self.files.delete_file(&image);
                return Err(e);
            }
        };
        if let Err(e) = self.repository.set_receipt_image(id, &image).await {
            self.files.delete_file(&image);
            return Err(e);
        }

        if let Some(old) = previous.as_deref().filter(|old| *old != image) {
            self.files.delete_file(old);
        }
        info!("Payment receipt {} photo replaced", id);
        self.find_receipt(id).await.map(ReceiptView::from)
    }

    pub async fn receipt_image(&self, id: i64) -> Result<StoredImage, ApiError> {
        let receipt = self.find_receipt(id).await?;
        self.files.read_image(receipt.receipt_image.as_deref())
    }

    async fn find_receipt(&self, id: i64) -> Result<PaymentReceipt, ApiError> {
        self.repository
            .find_receipt(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_RECEIPT_NOT_FOUND.to_string()))
    }
}
