//! WebAssembly module for the Pharmacy Manager frontend
//!
//! Provides client-side computation for:
//! - Pack / loose-unit quantity display
//! - GST rate reconciliation on the batch form
//! - Invoice amounts in words
//! - Dashboard date filters
//! - Request sequencing and search debouncing

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{DateFilter, Debouncer, ManageBatchInput, RateEntry, RequestSequencer, RequestTicket};
use validator::Validate;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn to_js(message: String) -> JsValue {
    warn(&message);
    JsValue::from_str(&message)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

// ============================================================================
// Quantity
// ============================================================================

fn quantity_display(
    qty: f64,
    pack: f64,
    primary_unit: Option<String>,
    secondary_unit: Option<String>,
) -> Result<String, String> {
    let qty = shared::parse_quantity(qty).map_err(|e| e.to_string())?;
    let pack = shared::parse_pack(pack).map_err(|e| e.to_string())?;
    Ok(shared::convert_quantity(
        qty,
        pack,
        primary_unit.as_deref(),
        secondary_unit.as_deref(),
    ))
}

fn quantity_value_json(qty: f64, pack: f64) -> Result<String, String> {
    let qty = shared::parse_quantity(qty).map_err(|e| e.to_string())?;
    let pack = shared::parse_pack(pack).map_err(|e| e.to_string())?;
    match shared::convert_quantity_value(qty, pack) {
        // Callers check for a bare 0 when there is no stock
        None => Ok("0".to_string()),
        Some(split) => to_json(&split),
    }
}

fn quantity_fraction(qty: f64, pack: f64) -> Result<String, String> {
    let qty = shared::parse_quantity(qty).map_err(|e| e.to_string())?;
    let pack = shared::parse_pack(pack).map_err(|e| e.to_string())?;
    Ok(shared::convert_to_fraction(qty, pack))
}

/// Render a stock quantity as "13 Strip, 5 Tab"; "-" when empty
#[wasm_bindgen(js_name = convertQuantity)]
pub fn convert_quantity(
    qty: f64,
    pack: f64,
    primary_unit: Option<String>,
    secondary_unit: Option<String>,
) -> Result<String, JsValue> {
    quantity_display(qty, pack, primary_unit, secondary_unit).map_err(to_js)
}

/// `{"packs":13,"loose":5}`, or `0` when there is no stock
#[wasm_bindgen(js_name = convertQuantityValue)]
pub fn convert_quantity_value(qty: f64, pack: f64) -> Result<String, JsValue> {
    quantity_value_json(qty, pack).map_err(to_js)
}

/// Mixed fraction of packs, e.g. "13 5/10"
#[wasm_bindgen(js_name = convertToFraction)]
pub fn convert_to_fraction(qty: f64, pack: f64) -> Result<String, JsValue> {
    quantity_fraction(qty, pack).map_err(to_js)
}

// ============================================================================
// GST / batch form
// ============================================================================

fn rates_json(entry_json: &str) -> Result<String, String> {
    let entry: RateEntry =
        serde_json::from_str(entry_json).map_err(|e| format!("Invalid rates JSON: {}", e))?;
    let rates = shared::reconcile_rates(&entry).map_err(|e| e.to_string())?;
    to_json(&rates)
}

fn batch_submission_json(form_json: &str) -> Result<String, String> {
    let form: ManageBatchInput =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid batch JSON: {}", e))?;
    form.validate().map_err(|e| e.to_string())?;
    let record = form.into_record().map_err(|e| e.to_string())?;
    to_json(&record)
}

/// Canonical (stored) purchase and sale rates for the batch form
#[wasm_bindgen(js_name = reconcileBatchRates)]
pub fn reconcile_batch_rates(entry_json: &str) -> Result<String, JsValue> {
    rates_json(entry_json).map_err(to_js)
}

/// Validate the batch form and build the payload posted to manage-batch
#[wasm_bindgen(js_name = prepareBatchSubmission)]
pub fn prepare_batch_submission(form_json: &str) -> Result<String, JsValue> {
    batch_submission_json(form_json).map_err(to_js)
}

// ============================================================================
// Amount in words
// ============================================================================

fn amount_words(amount: f64) -> Result<String, String> {
    let amount = shared::parse_amount(amount).map_err(|e| e.to_string())?;
    Ok(shared::number_to_words(amount))
}

/// Invoice amount in words using crore / lakh grouping
#[wasm_bindgen(js_name = numberToWords)]
pub fn number_to_words(amount: f64) -> Result<String, JsValue> {
    amount_words(amount).map_err(to_js)
}

// ============================================================================
// Date filters
// ============================================================================

#[derive(Serialize)]
struct DateRangeResponse {
    filter: DateFilter,
    from: NaiveDateTime,
    to: NaiveDateTime,
}

fn date_range_json(label: &str, now: NaiveDateTime) -> Result<String, String> {
    let filter = DateFilter::from_label(label);
    let range = filter.resolve(now);
    to_json(&DateRangeResponse {
        filter,
        from: range.from,
        to: range.to,
    })
}

/// Current local wall-clock time from the browser
fn local_now() -> Result<NaiveDateTime, String> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .and_then(|date| {
            date.and_hms_milli_opt(
                now.get_hours(),
                now.get_minutes(),
                now.get_seconds(),
                now.get_milliseconds(),
            )
        })
        .ok_or_else(|| "Browser clock returned an invalid date".to_string())
}

/// `{from, to}` local timestamps for a dashboard filter label
#[wasm_bindgen(js_name = convertFilterToDateRange)]
pub fn convert_filter_to_date_range(label: &str) -> Result<String, JsValue> {
    local_now()
        .and_then(|now| date_range_json(label, now))
        .map_err(to_js)
}

// ============================================================================
// Request sequencing
// ============================================================================

/// Guards a view against stale fetch responses
#[wasm_bindgen]
#[derive(Default)]
pub struct FetchSequencer {
    inner: RequestSequencer,
}

#[wasm_bindgen]
impl FetchSequencer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a request about to be sent
    pub fn begin(&self) -> f64 {
        self.inner.begin().sequence() as f64
    }

    /// Whether the response for `ticket` may update the view
    pub fn accept(&self, ticket: f64) -> bool {
        let accepted = self.inner.accept(RequestTicket::from_sequence(ticket as u64));
        if !accepted {
            warn(&format!("Discarding stale response for request {}", ticket));
        }
        accepted
    }

    /// Drop every in-flight request, e.g. on unmount
    #[wasm_bindgen(js_name = cancelAll)]
    pub fn cancel_all(&self) {
        self.inner.cancel_all();
    }
}

/// Search box debounce fed with `Date.now()` timestamps
#[wasm_bindgen]
pub struct SearchDebouncer {
    inner: Debouncer,
}

#[wasm_bindgen]
impl SearchDebouncer {
    #[wasm_bindgen(constructor)]
    pub fn new(delay_ms: Option<f64>) -> Self {
        let inner = match delay_ms {
            Some(ms) if ms.is_finite() && ms >= 0.0 => Debouncer::new(ms as u64),
            _ => Debouncer::default(),
        };
        Self { inner }
    }

    pub fn touch(&mut self, now_ms: f64) {
        self.inner.touch(now_ms.max(0.0) as u64);
    }

    /// True once when the search should be dispatched
    pub fn poll(&mut self, now_ms: f64) -> bool {
        self.inner.poll(now_ms.max(0.0) as u64)
    }

    #[wasm_bindgen(getter, js_name = delayMs)]
    pub fn delay_ms(&self) -> f64 {
        self.inner.delay_ms() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_quantity_display() {
        assert_eq!(
            quantity_display(135.0, 10.0, Some("Box".into()), Some("Unit".into())).unwrap(),
            "13 Box, 5 Unit"
        );
        assert_eq!(quantity_display(0.0, 10.0, None, None).unwrap(), "-");
        assert_eq!(quantity_display(130.0, 10.0, None, None).unwrap(), "13 packs");
        assert!(quantity_display(-5.0, 10.0, None, None).is_err());
        assert!(quantity_display(5.5, 10.0, None, None).is_err());
    }

    #[test]
    fn test_quantity_value_sentinel() {
        assert_eq!(quantity_value_json(0.0, 10.0).unwrap(), "0");
        assert_eq!(quantity_value_json(f64::NAN, 10.0).unwrap(), "0");
        assert_eq!(
            quantity_value_json(135.0, 10.0).unwrap(),
            r#"{"packs":13,"loose":5}"#
        );
        assert_eq!(
            quantity_value_json(7.0, 0.0).unwrap(),
            r#"{"packs":7,"loose":0}"#
        );
    }

    #[test]
    fn test_quantity_fraction() {
        assert_eq!(quantity_fraction(135.0, 10.0).unwrap(), "13 5/10");
    }

    #[test]
    fn test_rates_json() {
        let json = rates_json(
            r#"{"purchaseRate":"112","saleRate":"100","gstPer":"12",
                "purchaseGstType":"Incl gst","saleGstType":"Excl gst"}"#,
        )
        .unwrap();
        let rates: shared::CanonicalRates = serde_json::from_str(&json).unwrap();
        assert_eq!(rates.purchase_rate, Decimal::from(100));
        assert_eq!(rates.sale_rate, Decimal::from(112));
        assert!(rates_json("not json").is_err());
    }

    #[test]
    fn test_batch_submission_requires_batch_number() {
        let form = r#"{
            "inventoryId": "00000000-0000-0000-0000-000000000000",
            "batchNumber": "",
            "expiry": "01/26",
            "mrp": 50,
            "gstPer": 5,
            "purchaseRate": 40,
            "saleRate": 45
        }"#;
        let err = batch_submission_json(form).unwrap_err();
        assert!(err.contains("batch_number"));
    }

    #[test]
    fn test_batch_submission_quantity() {
        let form = r#"{
            "inventoryId": "00000000-0000-0000-0000-000000000000",
            "batchNumber": "B7",
            "expiry": "01/26",
            "mrp": 50,
            "gstPer": 5,
            "purchaseRate": 40,
            "saleRate": 45,
            "pack": 10,
            "packs": 3,
            "loose": 4
        }"#;
        let json = batch_submission_json(form).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["quantity"], 34);
        let sale_rate: Decimal = value["saleRate"].as_str().unwrap().parse().unwrap();
        assert_eq!(sale_rate, "47.25".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_amount_words() {
        assert_eq!(amount_words(0.0).unwrap(), "Zero");
        assert_eq!(amount_words(1_500.0).unwrap(), "One Thousand Five Hundred");
        assert!(amount_words(-1.0).is_err());
        assert!(amount_words(10.5).is_err());
    }

    #[test]
    fn test_date_range_json() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 13)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let json = date_range_json("This Week", now).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["filter"], "This Week");
        assert_eq!(value["from"], "2024-03-10T00:00:00");
        assert_eq!(value["to"], "2024-03-16T23:59:59.999");
    }

    #[test]
    fn test_fetch_sequencer() {
        let seq = FetchSequencer::new();
        let first = seq.begin();
        let second = seq.begin();
        assert!(seq.inner.accept(RequestTicket::from_sequence(second as u64)));
        assert!(!seq.inner.accept(RequestTicket::from_sequence(first as u64)));
    }

    #[test]
    fn test_search_debouncer() {
        let mut debounce = SearchDebouncer::new(None);
        assert_eq!(debounce.delay_ms(), 500.0);
        debounce.touch(1_000.0);
        assert!(!debounce.poll(1_200.0));
        assert!(debounce.poll(1_500.0));
    }
}
