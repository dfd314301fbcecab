//! Delivery reports and their contract pricing.

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::constants::{ERR_DELIVERY_NOT_FOUND, ERR_INVALID_DELIVERY_ORDER_FLAG};
use crate::errors::ApiError;
use crate::models::{
    resolve_price, source_type_for, Claims, CreateDeliveryRequest, DeliveryListQuery,
    DeliveryOrderFlag, DeliveryStatus, DeliveryView, Pagination, PaginatedResponse,
    UpdateDeliveryRequest,
};
use crate::repositories::delivery_repository::{DeliveryChanges, NewDelivery};
use crate::repositories::{ContractRepository, CustomerRepository, DeliveryRepository};
use crate::services::file_service::{FileService, StoredImage};
use crate::utils::{line_total, mask_name};
use crate::validators::keyword_tokens;

/// Contract number and price applied to a delivery.
struct DeliveryPrice {
    contract_no: String,
    unit_price: Decimal,
    total_amount: Option<Decimal>,
}

pub struct DeliveryService {
    repository: DeliveryRepository,
    contracts: ContractRepository,
    customers: CustomerRepository,
    files: FileService,
}

impl DeliveryService {
    pub fn new(
        repository: DeliveryRepository,
        contracts: ContractRepository,
        customers: CustomerRepository,
        files: FileService,
    ) -> Self {
        Self {
            repository,
            contracts,
            customers,
            files,
        }
    }

    pub async fn create(
        &self,
        actor: &Claims,
        req: CreateDeliveryRequest,
    ) -> Result<DeliveryView, ApiError> {
        let flag = parse_flag(req.has_delivery_order.as_deref())?.unwrap_or(DeliveryOrderFlag::Without);
        let source_type = source_type_for(flag, req.uploaded_by.as_deref());

        let price = match (
            req.target_factory_name.as_deref(),
            req.product_name.as_deref(),
            req.quantity,
        ) {
            (Some(factory), Some(product), Some(quantity)) => {
                self.price_from_contract(factory, product, quantity).await?
            }
            _ => None,
        };

        let delivery = NewDelivery {
            report_date: req.report_date,
            warehouse: req.warehouse,
            target_factory_id: req.target_factory_id,
            target_factory_name: req.target_factory_name,
            product_name: req.product_name,
            quantity: req.quantity,
            vehicle_no: req.vehicle_no,
            driver_name: req.driver_name,
            driver_phone: req.driver_phone,
            driver_id_card: req.driver_id_card,
            has_delivery_order: flag.as_str().to_string(),
            delivery_order_image: req.delivery_order_image,
            source_type: source_type.to_string(),
            shipper: req.shipper.or_else(|| Some(actor.name.clone())),
            payee: req.payee,
            service_fee: req.service_fee.unwrap_or_default(),
            contract_no: price
                .as_ref()
                .map(|p| p.contract_no.clone())
                .or(req.contract_no),
            contract_unit_price: price.as_ref().map(|p| p.unit_price),
            total_amount: price.as_ref().and_then(|p| p.total_amount),
            status: req
                .status
                .unwrap_or_else(|| DeliveryStatus::Pending.as_str().to_string()),
        };

        let id = self.repository.insert(&delivery).await?;
        info!(
            "User {} created delivery {} for driver {}",
            actor.sub,
            id,
            delivery.driver_name.as_deref().map(mask_name).unwrap_or_default()
        );
        self.get(id).await
    }

    /// Creates a delivery reported as a form with an optional order photo.
    /// The photo is kept only when the delivery travels with an order.
    pub async fn create_with_image(
        &self,
        actor: &Claims,
        mut req: CreateDeliveryRequest,
        image: Option<String>,
    ) -> Result<DeliveryView, ApiError> {
        let with_order = matches!(
            parse_flag(req.has_delivery_order.as_deref()),
            Ok(Some(DeliveryOrderFlag::With))
        );

        let saved = match image {
            Some(path) if with_order => {
                req.delivery_order_image = Some(path.clone());
                Some(path)
            }
            Some(path) => {
                debug!("Discarding order photo for a delivery without an order");
                self.files.delete_file(&path);
                None
            }
            None => None,
        };

        match self.create(actor, req).await {
            Ok(view) => Ok(view),
            Err(e) => {
                if let Some(path) = saved.as_deref() {
                    self.files.delete_file(path);
                }
                Err(e)
            }
        }
    }

    pub async fn list(
        &self,
        query: DeliveryListQuery,
    ) -> Result<PaginatedResponse<DeliveryView>, ApiError> {
        let pagination = Pagination::new(query.page, query.page_size);
        let tokens = keyword_tokens(query.fuzzy_keywords.as_deref());
        let (rows, total) = self.repository.list(&query, &tokens, pagination).await?;
        let views = rows.into_iter().map(DeliveryView::from).collect();
        Ok(PaginatedResponse::new(views, total, pagination))
    }

    pub async fn get(&self, id: i64) -> Result<DeliveryView, ApiError> {
        self.repository
            .find_by_id(id)
            .await?
            .map(DeliveryView::from)
            .ok_or_else(|| ApiError::NotFound(ERR_DELIVERY_NOT_FOUND.to_string()))
    }

    /// Returns `None` when the request changes nothing. The source type is
    /// derived again whenever the order flag or uploader is supplied.
    pub async fn update(
        &self,
        id: i64,
        req: UpdateDeliveryRequest,
    ) -> Result<Option<DeliveryView>, ApiError> {
        let current = self.get(id).await?.delivery;

        let flag = parse_flag(req.has_delivery_order.as_deref())?;
        let source_type = if flag.is_some() || req.uploaded_by.is_some() {
            let effective = match flag {
                Some(f) => f,
                None => current
                    .has_delivery_order
                    .parse()
                    .unwrap_or(DeliveryOrderFlag::Without),
            };
            Some(source_type_for(effective, req.uploaded_by.as_deref()).to_string())
        } else {
            None
        };

        let changes = DeliveryChanges {
            report_date: req.report_date,
            warehouse: req.warehouse,
            target_factory_id: req.target_factory_id,
            target_factory_name: req.target_factory_name,
            product_name: req.product_name,
            quantity: req.quantity,
            vehicle_no: req.vehicle_no,
            driver_name: req.driver_name,
            driver_phone: req.driver_phone,
            driver_id_card: req.driver_id_card,
            has_delivery_order: flag.map(|f| f.as_str().to_string()),
            delivery_order_image: req.delivery_order_image,
            source_type,
            shipper: req.shipper,
            payee: req.payee,
            service_fee: req.service_fee,
            contract_no: req.contract_no,
            contract_unit_price: req.contract_unit_price,
            total_amount: req.total_amount,
            status: req.status,
        };

        if !self.repository.update(id, changes).await? {
            return Ok(None);
        }
        info!("Delivery {} updated", id);
        self.get(id).await.map(Some)
    }

    /// Deletes the delivery and its order photo.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let image = self
            .repository
            .find_by_id(id)
            .await?
            .and_then(|d| d.delivery_order_image);

        if self.repository.delete(id).await? == 0 {
            warn!("Delete failed: delivery {} not found", id);
            return Err(ApiError::NotFound(ERR_DELIVERY_NOT_FOUND.to_string()));
        }
        if let Some(path) = image.as_deref() {
            self.files.delete_file(path);
        }
        info!("Delivery {} deleted", id);
        Ok(())
    }

    /// Replaces the order photo of a delivery. When `flag` is given the order
    /// flag is updated with it and the source type derived again from
    /// `uploaded_by`. The previous photo is removed once the row points at
    /// the new one; on failure the new photo is removed instead.
    pub async fn attach_order_image(
        &self,
        id: i64,
        image: String,
        flag: Option<&str>,
        uploaded_by: Option<&str>,
    ) -> Result<DeliveryView, ApiError> {
        match self.replace_order_image(id, &image, flag, uploaded_by).await {
            Ok(view) => Ok(view),
            Err(e) => {
                self.files.delete_file(&image);
                Err(e)
            }
        }
    }

    async fn replace_order_image(
        &self,
        id: i64,
        image: &str,
        flag: Option<&str>,
        uploaded_by: Option<&str>,
    ) -> Result<DeliveryView, ApiError> {
        let flag = parse_flag(flag)?;
        let previous = self.get(id).await?.delivery.delivery_order_image;

        let changes = DeliveryChanges {
            has_delivery_order: flag.map(|f| f.as_str().to_string()),
            source_type: flag.map(|f| source_type_for(f, uploaded_by).to_string()),
            delivery_order_image: Some(image.to_string()),
            ..Default::default()
        };
        self.repository.update(id, changes).await?;

        if let Some(old) = previous.as_deref().filter(|old| *old != image) {
            self.files.delete_file(old);
        }
        info!("Delivery {} order photo replaced", id);
        self.get(id).await
    }

    /// Clears the order photo; the order flag is left as it is.
    pub async fn remove_order_image(&self, id: i64) -> Result<(), ApiError> {
        let previous = self.get(id).await?.delivery.delivery_order_image;
        self.repository.clear_order_image(id).await?;
        if let Some(old) = previous.as_deref() {
            self.files.delete_file(old);
        }
        info!("Delivery {} order photo removed", id);
        Ok(())
    }

    pub async fn order_image(&self, id: i64) -> Result<StoredImage, ApiError> {
        let delivery = self.get(id).await?.delivery;
        self.files.read_image(delivery.delivery_order_image.as_deref())
    }

    /// Prices a delivery from the factory's contract in force today. Unknown
    /// factories and factories without a current contract stay unpriced.
    async fn price_from_contract(
        &self,
        factory: &str,
        product: &str,
        quantity: Decimal,
    ) -> Result<Option<DeliveryPrice>, ApiError> {
        if !self.customers.exists_by_name(factory).await? {
            debug!("Factory {} is not a customer; delivery left unpriced", factory);
            return Ok(None);
        }
        let Some(contract) = self.contracts.current_for_smelter(factory).await? else {
            debug!("No contract in force for {}", factory);
            return Ok(None);
        };

        let products = self.contracts.priced_products(&contract.contract_no).await?;
        Ok(resolve_price(&products, product).map(|p| DeliveryPrice {
            contract_no: contract.contract_no.clone(),
            unit_price: p.unit_price,
            total_amount: line_total(Some(p.unit_price), Some(quantity)),
        }))
    }
}

fn parse_flag(flag: Option<&str>) -> Result<Option<DeliveryOrderFlag>, ApiError> {
    flag.map(|f| {
        f.parse::<DeliveryOrderFlag>()
            .map_err(|_| ApiError::BadRequest(ERR_INVALID_DELIVERY_ORDER_FLAG.to_string()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(None).unwrap(), None);
        assert_eq!(parse_flag(Some("有")).unwrap(), Some(DeliveryOrderFlag::With));
        assert!(matches!(parse_flag(Some("maybe")), Err(ApiError::BadRequest(_))));
    }
}
