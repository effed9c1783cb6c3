// Product calculation endpoint
//
// `h5/product/getCalculateSum/v1` evaluates vendor-side formulas such as
// airflow (CFM) and static pressure (PA) for a fan speed percentage.

use tracing::debug;

use crate::client::MarsProClient;
use crate::error::Error;
use crate::models::{CalculateArg, CalculateRequest, FanCalculation};

const CALCULATE_ENDPOINT: &str = "h5/product/getCalculateSum/v1";

/// Product code the app sends for inline fans.
pub const FAN_PRODUCT_CODE: &str = "24";

pub const CFM_CALCULATION: &str = "cfmCalculation";
pub const PA_CALCULATION: &str = "paCalculation";

impl MarsProClient {
    /// Evaluate a named vendor calculation.
    ///
    /// Returns the raw `data` value; its shape depends on the formula.
    pub async fn calculate_sum(&self, request: &CalculateRequest) -> Result<serde_json::Value, Error> {
        debug!(
            device_id = %request.device_id,
            calculation = %request.calculation_name,
            "requesting calculation"
        );
        self.post(CALCULATE_ENDPOINT, request).await
    }

    /// Airflow and pressure figures for a fan running at `percentage`.
    pub async fn fan_airflow(&self, device_id: &str, percentage: u8) -> Result<FanCalculation, Error> {
        let cfm = self
            .calculate_sum(&wind_percent_request(device_id, CFM_CALCULATION, percentage))
            .await?;
        let pa = self
            .calculate_sum(&wind_percent_request(device_id, PA_CALCULATION, percentage))
            .await?;
        Ok(FanCalculation { percentage, cfm, pa })
    }
}

fn wind_percent_request(device_id: &str, calculation: &str, percentage: u8) -> CalculateRequest {
    CalculateRequest {
        device_id: device_id.to_owned(),
        product_code: FAN_PRODUCT_CODE.to_owned(),
        calculation_name: calculation.to_owned(),
        args_list: vec![CalculateArg {
            arg_name: "windPercent".into(),
            arg_value: percentage.into(),
        }],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wind_percent_request_shape() {
        let body = serde_json::to_value(wind_percent_request("dev-9", CFM_CALCULATION, 40)).unwrap();
        assert_eq!(
            body,
            json!({
                "deviceId": "dev-9",
                "productCode": "24",
                "calculationName": "cfmCalculation",
                "argsList": [{ "argName": "windPercent", "argValue": 40 }]
            })
        );
    }
}
