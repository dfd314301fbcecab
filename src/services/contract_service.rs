//! Contract management: creation with duplicate detection, listing, CSV
//! export, text parsing and the periodic expiry sweep.

use log::{error, info, warn};
use rust_decimal::Decimal;
use std::time::Duration;

use crate::constants::{
    ERR_CONTRACT_NOT_FOUND, ERR_CONTRACT_NO_EXISTS, ERR_CONTRACT_NO_REQUIRED, ERR_INTERNAL,
    ERR_PRODUCT_NAME_REQUIRED,
};
use crate::errors::ApiError;
use crate::models::{
    end_date_for, export_file_name, truck_count, ContractDetail, ContractExportRow,
    ContractListItem, ContractListQuery, ContractParseResult, ContractProductInput,
    ContractStatus, CreateContractRequest, ExportContractsRequest, Pagination, PaginatedResponse,
    UpdateContractRequest,
};
use crate::repositories::contract_repository::{ContractChanges, NewContract};
use crate::repositories::ContractRepository;
use crate::services::contract_parser::parse_contract;
use crate::services::file_service::{FileService, StoredImage};
use crate::validators::keyword_tokens;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct ContractService {
    repository: ContractRepository,
    files: FileService,
}

impl ContractService {
    pub fn new(repository: ContractRepository, files: FileService) -> Self {
        Self { repository, files }
    }

    /// Creates a contract and its products.
    ///
    /// A signing date fixes the end date. A contract equal in every business
    /// field and product set to an existing one is rejected.
    pub async fn create(&self, req: CreateContractRequest) -> Result<ContractDetail, ApiError> {
        let contract_no = req.contract_no.trim().to_string();
        if contract_no.is_empty() {
            return Err(ApiError::BadRequest(ERR_CONTRACT_NO_REQUIRED.to_string()));
        }
        let products = clean_products(req.products)?;

        let contract = NewContract {
            contract_no,
            contract_date: req.contract_date,
            end_date: req.contract_date.map(end_date_for).or(req.end_date),
            smelter_company: req.smelter_company,
            total_quantity: req.total_quantity,
            truck_count: truck_count(req.total_quantity),
            arrival_payment_ratio: req.arrival_payment_ratio.unwrap_or_else(|| Decimal::new(9, 1)),
            final_payment_ratio: req.final_payment_ratio.unwrap_or_else(|| Decimal::new(1, 1)),
            contract_image_path: req.contract_image_path,
            status: req
                .status
                .unwrap_or_else(|| ContractStatus::Active.as_str().to_string()),
            remarks: req.remarks,
            products,
        };

        if let Some(existing) = self.repository.find_duplicate(&contract).await? {
            warn!("Contract {} duplicates contract {}", contract.contract_no, existing);
            return Err(ApiError::Conflict(format!(
                "An identical contract already exists (id {})",
                existing
            )));
        }
        if self.repository.contract_no_taken(&contract.contract_no, None).await? {
            warn!("Contract number {} already exists", contract.contract_no);
            return Err(ApiError::Conflict(ERR_CONTRACT_NO_EXISTS.to_string()));
        }

        let id = self.repository.create(&contract).await?;
        info!(
            "Contract {} created as {} with {} products",
            contract.contract_no,
            id,
            contract.products.len()
        );
        self.get(id).await
    }

    pub async fn list(
        &self,
        query: ContractListQuery,
    ) -> Result<PaginatedResponse<ContractListItem>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let (items, total) = self.repository.list(&query, &tokens, pagination).await?;
        Ok(PaginatedResponse::new(items, total, pagination))
    }

    pub async fn get(&self, id: i64) -> Result<ContractDetail, ApiError> {
        let contract = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_CONTRACT_NOT_FOUND.to_string()))?;
        let products = self.repository.products(contract.id).await?;
        Ok(ContractDetail::new(contract, products))
    }

    pub async fn get_by_no(&self, contract_no: &str) -> Result<ContractDetail, ApiError> {
        let contract = self
            .repository
            .find_by_no(contract_no.trim())
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_CONTRACT_NOT_FOUND.to_string()))?;
        let products = self.repository.products(contract.id).await?;
        Ok(ContractDetail::new(contract, products))
    }

    /// Returns `None` when the request changes nothing.
    pub async fn update(
        &self,
        id: i64,
        req: UpdateContractRequest,
    ) -> Result<Option<ContractDetail>, ApiError> {
        self.get(id).await?;

        let contract_no = req.contract_no.map(|no| no.trim().to_string());
        if let Some(no) = contract_no.as_deref() {
            if no.is_empty() {
                return Err(ApiError::BadRequest(ERR_CONTRACT_NO_REQUIRED.to_string()));
            }
            if self.repository.contract_no_taken(no, Some(id)).await? {
                warn!("Contract {} update rejected: number {} taken", id, no);
                return Err(ApiError::Conflict(ERR_CONTRACT_NO_EXISTS.to_string()));
            }
        }

        let changes = ContractChanges {
            contract_no,
            contract_date: req.contract_date,
            end_date: req.end_date,
            smelter_company: req.smelter_company,
            total_quantity: req.total_quantity,
            truck_count: truck_count(req.total_quantity),
            arrival_payment_ratio: req.arrival_payment_ratio,
            final_payment_ratio: req.final_payment_ratio,
            contract_image_path: req.contract_image_path,
            status: req.status,
            remarks: req.remarks,
            products: req.products.map(clean_products).transpose()?,
        };
        if changes.is_empty() {
            return Ok(None);
        }

        self.repository.update(id, changes).await?;
        info!("Contract {} updated", id);
        self.get(id).await.map(Some)
    }

    /// Deletes the contract, its products and its scan.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let image = self
            .repository
            .find_by_id(id)
            .await?
            .and_then(|c| c.contract_image_path);

        if self.repository.delete(id).await? == 0 {
            warn!("Delete failed: contract {} not found", id);
            return Err(ApiError::NotFound(ERR_CONTRACT_NOT_FOUND.to_string()));
        }
        if let Some(path) = image.as_deref() {
            self.files.delete_file(path);
        }
        info!("Contract {} deleted", id);
        Ok(())
    }

    /// Stores a new contract scan and removes the one it replaces.
    pub async fn attach_image(&self, id: i64, image: String) -> Result<ContractDetail, ApiError> {
        let previous = match self.get(id).await {
            Ok(detail) => detail.contract.contract_image_path,
            Err(e) => {
                self.files.delete_file(&image);
                return Err(e);
            }
        };

        let changes = ContractChanges {
            contract_image_path: Some(image.clone()),
            ..Default::default()
        };
        if let Err(e) = self.repository.update(id, changes).await {
            self.files.delete_file(&image);
            return Err(e);
        }

        if let Some(old) = previous.as_deref().filter(|old| *old != image) {
            self.files.delete_file(old);
        }
        info!("Contract {} scan replaced", id);
        self.get(id).await
    }

    pub async fn image(&self, id: i64) -> Result<(String, StoredImage), ApiError> {
        let contract = self.get(id).await?.contract;
        let image = self.files.read_image(contract.contract_image_path.as_deref())?;
        Ok((contract.contract_no, image))
    }

    /// Builds the CSV export and its download file name.
    pub async fn export(&self, req: ExportContractsRequest) -> Result<(String, Vec<u8>), ApiError> {
        let ids = req.contract_ids.unwrap_or_default();
        let rows = self.repository.export_rows(&ids).await?;

        let file_name = if ids.len() == 1 {
            export_file_name(rows.first().map(|r| r.contract_no.as_str()))
        } else {
            export_file_name(None)
        };

        let body = write_csv(&rows).map_err(|e| {
            error!("Failed to write contract export: {}", e);
            ApiError::InternalServerError(ERR_INTERNAL.to_string())
        })?;

        info!("Exported {} contract rows to {}", rows.len(), file_name);
        Ok((file_name, body))
    }

    pub async fn expire(&self, grace_days: i64) -> Result<u64, ApiError> {
        let affected = self.repository.expire_overdue(grace_days).await?;
        if affected > 0 {
            info!("Marked {} contracts as lapsed", affected);
        }
        Ok(affected)
    }

    pub fn parse(&self, lines: &[String]) -> ContractParseResult {
        parse_contract(lines)
    }
}

/// Trims product names and rejects blank ones.
fn clean_products(products: Vec<ContractProductInput>) -> Result<Vec<ContractProductInput>, ApiError> {
    products
        .into_iter()
        .map(|p| {
            let name = p.product_name.trim();
            if name.is_empty() {
                return Err(ApiError::BadRequest(ERR_PRODUCT_NAME_REQUIRED.to_string()));
            }
            Ok(ContractProductInput {
                product_name: name.to_string(),
                unit_price: p.unit_price,
            })
        })
        .collect()
}

fn write_csv(rows: &[ContractExportRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(ContractExportRow::HEADERS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Runs the expiry sweep now and then every `interval_secs`.
pub fn spawn_contract_expiry(
    repository: ContractRepository,
    grace_days: i64,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            interval.tick().await;
            match repository.expire_overdue(grace_days).await {
                Ok(0) => {}
                Ok(n) => info!("Contract expiry: {} contracts lapsed", n),
                Err(e) => error!("Contract expiry failed: {:?}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn export_row(no: &str, product: Option<&str>) -> ContractExportRow {
        ContractExportRow {
            id: 1,
            seq_no: Some(3),
            contract_no: no.to_string(),
            contract_date: NaiveDate::from_ymd_opt(2025, 2, 26),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 3),
            smelter_company: Some("金利".to_string()),
            total_quantity: Some(Decimal::from(350)),
            truck_count: Some(Decimal::from(10)),
            arrival_payment_ratio: Some(Decimal::new(9, 1)),
            final_payment_ratio: Some(Decimal::new(1, 1)),
            status: "生效中".to_string(),
            remarks: None,
            created_at: None,
            product_name: product.map(str::to_string),
            unit_price: product.map(|_| Decimal::from(9200)),
        }
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let body = write_csv(&[export_row("HT-1", Some("电动车")), export_row("HT-1", None)]).unwrap();
        assert!(body.starts_with(UTF8_BOM));

        let text = String::from_utf8(body[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(ContractExportRow::HEADERS.join(",").as_str()));
        assert!(lines.next().unwrap().contains("电动车,9200"));
        assert!(lines.next().unwrap().ends_with(",,"));
    }

    #[test]
    fn test_clean_products_trims_and_rejects_blank_names() {
        let cleaned = clean_products(vec![ContractProductInput {
            product_name: " 黑皮 ".to_string(),
            unit_price: None,
        }])
        .unwrap();
        assert_eq!(cleaned[0].product_name, "黑皮");

        let blank = clean_products(vec![ContractProductInput {
            product_name: "  ".to_string(),
            unit_price: None,
        }]);
        assert!(matches!(blank, Err(ApiError::BadRequest(_))));
    }
}
