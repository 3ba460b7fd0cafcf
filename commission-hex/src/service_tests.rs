//! CommissionService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use commission_types::{
        Bin, CommissionError, CountryCode, CountryResolver, CurrencyCode, RateResolver,
        Transaction, UpstreamError, UpstreamErrorKind,
    };

    use crate::CommissionService;

    /// In-memory country resolver. Unknown BINs are reported as not found.
    pub struct MockCountries {
        countries: HashMap<String, String>,
    }

    impl MockCountries {
        pub fn new() -> Self {
            Self {
                countries: HashMap::new(),
            }
        }

        pub fn with(mut self, bin: &str, country: &str) -> Self {
            self.countries.insert(bin.to_string(), country.to_string());
            self
        }
    }

    #[async_trait]
    impl CountryResolver for MockCountries {
        async fn resolve_country(&self, bin: &Bin) -> Result<CountryCode, UpstreamError> {
            self.countries
                .get(bin.as_str())
                .and_then(|c| CountryCode::parse(c))
                .ok_or_else(|| UpstreamError::NotFound {
                    service: "mock",
                    resource: format!("BIN {}", bin),
                })
        }
    }

    /// In-memory rate resolver quoting against EUR.
    ///
    /// EUR defaults to 1.0; unknown currencies fail with `InvalidData`.
    pub struct MockRates {
        rates: HashMap<String, f64>,
        failure: Option<UpstreamError>,
        calls: AtomicUsize,
    }

    impl MockRates {
        pub fn new() -> Self {
            Self {
                rates: HashMap::new(),
                failure: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with(mut self, currency: &str, rate: f64) -> Self {
            self.rates.insert(currency.to_string(), rate);
            self
        }

        pub fn failing(mut self, err: UpstreamError) -> Self {
            self.failure = Some(err);
            self
        }
    }

    #[async_trait]
    impl RateResolver for MockRates {
        async fn resolve_rate(&self, currency: &CurrencyCode) -> Result<f64, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            match self.rates.get(currency.as_str()) {
                Some(rate) => Ok(*rate),
                None if currency.as_str() == "EUR" => Ok(1.0),
                None => Err(UpstreamError::InvalidData {
                    service: "mock",
                    message: format!("Quote USD{} not available", currency),
                }),
            }
        }
    }

    fn service(
        countries: MockCountries,
        rates: MockRates,
    ) -> CommissionService<MockCountries, MockRates> {
        CommissionService::new(countries, rates, "EUR".parse().unwrap())
    }

    fn tx(bin: &str, amount: f64, currency: &str) -> Transaction {
        Transaction::new(bin, amount, currency).unwrap()
    }

    #[tokio::test]
    async fn test_eu_card_in_reference_currency() {
        let service = service(MockCountries::new().with("45717360", "DE"), MockRates::new());

        let commission = service
            .calculate_commission(&tx("45717360", 100.00, "EUR"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "1.00");
        assert_eq!(commission.to_f64(), 1.0);
    }

    #[tokio::test]
    async fn test_non_eu_card_in_foreign_currency() {
        let service = service(
            MockCountries::new().with("516793", "US"),
            MockRates::new().with("USD", 1.1),
        );

        // 50 / 1.1 = 45.4545.. * 0.02 = 0.9090..
        let commission = service
            .calculate_commission(&tx("516793", 50.00, "USD"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "0.91");
    }

    #[tokio::test]
    async fn test_zero_amount() {
        let service = service(
            MockCountries::new().with("516793", "US"),
            MockRates::new().with("JPY", 150.0),
        );

        let commission = service
            .calculate_commission(&tx("516793", 0.0, "JPY"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "0.00");
    }

    #[tokio::test]
    async fn test_exact_cent_is_not_rounded_up() {
        let service = service(MockCountries::new().with("45717360", "DE"), MockRates::new());

        // 150.00 * 1% = 1.50 exactly.
        let commission = service
            .calculate_commission(&tx("45717360", 150.00, "EUR"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "1.50");
    }

    #[tokio::test]
    async fn test_fraction_of_cent_rounds_up() {
        let service = service(MockCountries::new().with("45717360", "DE"), MockRates::new());

        let commission = service
            .calculate_commission(&tx("45717360", 100.01, "EUR"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "1.01");
    }

    #[tokio::test]
    async fn test_binary_float_amounts_do_not_overcharge() {
        let service = service(MockCountries::new().with("45717360", "DE"), MockRates::new());

        // 110.00 * 0.01 is 1.1000000000000001 in binary floating point.
        let commission = service
            .calculate_commission(&tx("45717360", 110.0, "EUR"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "1.10");
    }

    #[tokio::test]
    async fn test_eu_classification_is_case_insensitive() {
        let service = service(
            MockCountries::new().with("45717360", "de").with("516793", "us"),
            MockRates::new(),
        );

        let eu = service
            .calculate_commission(&tx("45717360", 100.0, "EUR"))
            .await
            .unwrap();
        let non_eu = service
            .calculate_commission(&tx("516793", 100.0, "EUR"))
            .await
            .unwrap();

        assert_eq!(eu.to_string(), "1.00");
        assert_eq!(non_eu.to_string(), "2.00");
    }

    #[tokio::test]
    async fn test_reference_currency_skips_conversion() {
        // A reference-currency rate other than 1.0 must not be applied.
        let service = service(
            MockCountries::new().with("45717360", "DE"),
            MockRates::new().with("EUR", 2.0),
        );

        let commission = service
            .calculate_commission(&tx("45717360", 100.0, "eur"))
            .await
            .unwrap();

        assert_eq!(commission.to_string(), "1.00");
    }

    #[tokio::test]
    async fn test_calculation_is_idempotent() {
        let service = service(
            MockCountries::new().with("516793", "US"),
            MockRates::new().with("JPY", 166.666_666_666_666_66),
        );
        let tx = tx("516793", 12345.67, "JPY");

        let first = service.calculate_commission(&tx).await.unwrap();
        let second = service.calculate_commission(&tx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[tokio::test]
    async fn test_zero_rate_is_rejected() {
        let service = service(
            MockCountries::new().with("516793", "US"),
            MockRates::new().with("XAU", 0.0),
        );

        let result = service
            .calculate_commission(&tx("516793", 10.0, "XAU"))
            .await;

        assert!(matches!(
            result,
            Err(CommissionError::NonPositiveRate { rate, .. }) if rate == 0.0
        ));
    }

    #[tokio::test]
    async fn test_negative_rate_is_rejected() {
        let service = service(
            MockCountries::new().with("516793", "US"),
            MockRates::new().with("GBP", -0.5),
        );

        let result = service
            .calculate_commission(&tx("516793", 10.0, "GBP"))
            .await;

        assert!(matches!(result, Err(CommissionError::NonPositiveRate { .. })));
    }

    #[tokio::test]
    async fn test_country_failure_propagates_unchanged() {
        let rates = MockRates::new();
        let service = service(MockCountries::new(), rates);

        let err = service
            .calculate_commission(&tx("45717360", 10.0, "EUR"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CommissionError::Upstream(ref e) if e.kind() == UpstreamErrorKind::NotFound
        ));
        // The rate lookup never runs once the country lookup has failed.
        assert_eq!(service_rates_calls(&service), 0);
    }

    #[tokio::test]
    async fn test_rate_failure_propagates_unchanged() {
        let limited = UpstreamError::RateLimited {
            service: "exchange-rates",
            status: Some(429),
        };
        let service = service(
            MockCountries::new().with("45717360", "DE"),
            MockRates::new().failing(limited.clone()),
        );

        let err = service
            .calculate_commission(&tx("45717360", 10.0, "USD"))
            .await
            .unwrap_err();

        assert_eq!(err, CommissionError::Upstream(limited));
    }

    fn service_rates_calls(service: &CommissionService<MockCountries, MockRates>) -> usize {
        service.rates().calls.load(Ordering::SeqCst)
    }
}
