//! Weighbills: entry, correction, confirmation and the helpers that match
//! them to deliveries and contract prices.

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::constants::{
    DEFAULT_PRODUCT_NAME, ERR_NO_CONTRACT_PRICE, ERR_NO_MATCHING_DELIVERY, ERR_WEIGHBILL_NOT_FOUND,
};
use crate::errors::ApiError;
use crate::models::{
    resolve_price, AutoFillRequest, AutoFillResponse, Claims, ConfirmWeighbillResponse,
    ContractPriceResponse, CreateWeighbillRequest, Delivery, Pagination, PaginatedResponse,
    UpdateWeighbillRequest, Weighbill, WeighbillDetail, WeighbillListItem, WeighbillListQuery,
    WeighbillParseResult, WeighbillStatus,
};
use crate::repositories::weighbill_repository::{NewWeighbill, WeighbillChanges};
use crate::repositories::{ContractRepository, DeliveryRepository, WeighbillRepository};
use crate::services::weighbill_parser::parse_weighbill;
use crate::utils::line_total;
use crate::validators::keyword_tokens;

const MATCHED: &str = "已匹配报货订单";
const NOT_MATCHED: &str = "未找到匹配的报货订单";
const PRICED: &str = "已获取合同单价";
const NOT_PRICED: &str = "未找到合同单价";

pub struct WeighbillService {
    repository: WeighbillRepository,
    deliveries: DeliveryRepository,
    contracts: ContractRepository,
}

impl WeighbillService {
    pub fn new(
        repository: WeighbillRepository,
        deliveries: DeliveryRepository,
        contracts: ContractRepository,
    ) -> Self {
        Self {
            repository,
            deliveries,
            contracts,
        }
    }

    pub async fn match_delivery(
        &self,
        vehicle_no: &str,
        weigh_date: NaiveDate,
    ) -> Result<Delivery, ApiError> {
        self.deliveries
            .match_for_weighing(vehicle_no.trim(), weigh_date)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_NO_MATCHING_DELIVERY.to_string()))
    }

    pub async fn contract_price(
        &self,
        contract_no: &str,
        product_name: Option<&str>,
    ) -> Result<ContractPriceResponse, ApiError> {
        let contract_no = contract_no.trim();
        let product_name = product_name
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PRODUCT_NAME);

        let products = self.contracts.priced_products(contract_no).await?;
        let found = resolve_price(&products, product_name).ok_or_else(|| {
            debug!("No priced product on contract {} for {}", contract_no, product_name);
            ApiError::NotFound(ERR_NO_CONTRACT_PRICE.to_string())
        })?;

        Ok(ContractPriceResponse {
            contract_no: contract_no.to_string(),
            product_name: product_name.to_string(),
            matched_product: found.product_name.clone(),
            unit_price: found.unit_price,
        })
    }

    /// Completes a draft from the matching delivery and the contract price.
    /// Nothing found is not an error; the messages say what was filled.
    pub async fn auto_fill(&self, req: AutoFillRequest) -> Result<AutoFillResponse, ApiError> {
        let mut draft = AutoFillResponse {
            weigh_date: req.weigh_date,
            vehicle_no: req.vehicle_no,
            contract_no: req.contract_no,
            product_name: req.product_name,
            net_weight: req.net_weight,
            ..Default::default()
        };

        if let (Some(date), Some(vehicle)) = (draft.weigh_date, draft.vehicle_no.as_deref()) {
            match self.deliveries.match_for_weighing(vehicle.trim(), date).await? {
                Some(delivery) => {
                    draft.matched_delivery_id = Some(delivery.id);
                    draft.warehouse = delivery.warehouse;
                    draft.target_factory_name = delivery.target_factory_name;
                    draft.driver_name = delivery.driver_name;
                    draft.driver_phone = delivery.driver_phone;
                    draft.driver_id_card = delivery.driver_id_card;
                    if draft.contract_no.is_none() {
                        draft.contract_no = delivery.contract_no;
                    }
                    draft.match_message = Some(MATCHED.to_string());
                }
                None => draft.match_message = Some(NOT_MATCHED.to_string()),
            }
        }

        if let Some(contract_no) = draft.contract_no.clone() {
            let product = draft
                .product_name
                .get_or_insert_with(|| DEFAULT_PRODUCT_NAME.to_string())
                .clone();
            match self.contract_price(&contract_no, Some(&product)).await {
                Ok(price) => {
                    draft.unit_price = Some(price.unit_price);
                    draft.price_message = Some(PRICED.to_string());
                }
                Err(ApiError::NotFound(_)) => draft.price_message = Some(NOT_PRICED.to_string()),
                Err(e) => return Err(e),
            }
        }

        draft.total_amount = line_total(draft.unit_price, draft.net_weight);
        Ok(draft)
    }

    pub async fn create(
        &self,
        actor: &Claims,
        req: CreateWeighbillRequest,
    ) -> Result<Weighbill, ApiError> {
        let manual = req.is_manual.unwrap_or(true);
        let bill = NewWeighbill {
            weigh_date: req.weigh_date,
            delivery_time: req.delivery_time,
            weigh_ticket_no: req.weigh_ticket_no,
            contract_no: req.contract_no,
            delivery_id: req.delivery_id,
            vehicle_no: req.vehicle_no,
            product_name: req.product_name,
            gross_weight: req.gross_weight,
            tare_weight: req.tare_weight,
            net_weight: req.net_weight,
            unit_price: req.unit_price,
            total_amount: req
                .total_amount
                .or_else(|| line_total(req.unit_price, req.net_weight)),
            weighbill_image: req.weighbill_image,
            ocr_status: if manual {
                WeighbillStatus::Confirmed
            } else {
                WeighbillStatus::Pending
            }
            .as_str()
            .to_string(),
            ocr_raw_data: req.ocr_raw_data,
            is_manual_corrected: i8::from(manual),
            uploader_id: actor.user_id(),
            uploader_name: actor.name.clone(),
        };

        let id = self.repository.insert(&bill).await?;
        info!("User {} uploaded weighbill {}", actor.sub, id);
        self.find(id).await
    }

    pub async fn list(
        &self,
        query: WeighbillListQuery,
    ) -> Result<PaginatedResponse<WeighbillListItem>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let (items, total) = self.repository.list(&query, &tokens, pagination).await?;
        Ok(PaginatedResponse::new(items, total, pagination))
    }

    pub async fn get(&self, id: i64) -> Result<WeighbillDetail, ApiError> {
        self.repository
            .find_detail(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_WEIGHBILL_NOT_FOUND.to_string()))
    }

    /// Any edit marks the bill as manually corrected.
    pub async fn update(&self, id: i64, req: UpdateWeighbillRequest) -> Result<Weighbill, ApiError> {
        self.find(id).await?;

        self.repository
            .update(
                id,
                WeighbillChanges {
                    weigh_date: req.weigh_date,
                    delivery_time: req.delivery_time,
                    weigh_ticket_no: req.weigh_ticket_no,
                    contract_no: req.contract_no,
                    delivery_id: req.delivery_id,
                    vehicle_no: req.vehicle_no,
                    product_name: req.product_name,
                    gross_weight: req.gross_weight,
                    tare_weight: req.tare_weight,
                    net_weight: req.net_weight,
                    unit_price: req.unit_price,
                    total_amount: req.total_amount,
                    weighbill_image: req.weighbill_image,
                },
            )
            .await?;

        info!("Weighbill {} corrected", id);
        self.find(id).await
    }

    pub async fn confirm(&self, id: i64) -> Result<ConfirmWeighbillResponse, ApiError> {
        let bill = self.find(id).await?;
        self.repository.confirm(id, bill.delivery_id).await?;

        info!("Weighbill {} confirmed (delivery {:?})", id, bill.delivery_id);
        Ok(ConfirmWeighbillResponse {
            weighbill_id: id,
            delivery_id: bill.delivery_id,
        })
    }

    pub async fn set_payment_schedule(&self, id: i64, date: NaiveDate) -> Result<Weighbill, ApiError> {
        self.find(id).await?;
        self.repository.set_payment_schedule(id, date).await?;
        info!("Weighbill {} scheduled for payment on {}", id, date);
        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if self.repository.delete(id).await? == 0 {
            warn!("Delete failed: weighbill {} not found", id);
            return Err(ApiError::NotFound(ERR_WEIGHBILL_NOT_FOUND.to_string()));
        }
        info!("Weighbill {} deleted", id);
        Ok(())
    }

    pub fn parse(&self, lines: &[String]) -> WeighbillParseResult {
        parse_weighbill(lines)
    }

    async fn find(&self, id: i64) -> Result<Weighbill, ApiError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(ERR_WEIGHBILL_NOT_FOUND.to_string()))
    }
}
