/// Generates one decode test per recorded response of an endpoint. Each
/// fixture must decode, and must decode to the same value again after being
/// written back out.
#[macro_export]
macro_rules! test_api_fixture {
    ($endpoint:ident, $data_type:ty, [$($case:literal),+ $(,)?]) => {
        paste::paste! {
            #[cfg(test)]
            #[allow(non_snake_case)]
            mod [<tests_ $endpoint>] {
                use super::*;
                use checkpointz_types::response::ApiResponse;
                use rstest::rstest;

                #[rstest]
                $(#[case($case)])+
                fn test_fixture(#[case] case: &str) {
                    let path = $crate::utils::fixture_path(stringify!($endpoint), case);

                    let response: ApiResponse<$data_type> = match $crate::utils::read_fixture(&path) {
                        Ok(response) => response,
                        Err(err) => panic!("{err:#}"),
                    };

                    let written = serde_json::to_string(&response).unwrap();
                    let reread: ApiResponse<$data_type> = serde_json::from_str(&written).unwrap();
                    assert_eq!(response, reread);
                }
            }
        }
    };
}
