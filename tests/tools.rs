//! End-to-end tests through the tools factory

mod helper;

use rstest::rstest;

use helper::create_test_factory;
use nuget_sandbox::facade::InputStatus;
use nuget_sandbox::service::FrameworkPrecedenceInput;
use nuget_sandbox::service::tools::{
    FindBestVersionMatchInput, FrameworkCompatibilityInput, GetNearestFrameworkInput,
    VersionComparisonInput,
};

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[tokio::test]
async fn available_versions_are_newest_first() {
    let (_temp_dir, factory) = create_test_factory(&[
        ("2.14.0", "net40"),
        ("4.3.0", "net45"),
        ("3.5.0", "net45"),
    ]);

    let versions: Vec<String> = factory
        .get_available_versions()
        .await
        .iter()
        .map(|v| v.to_string())
        .collect();

    assert_eq!(versions, vec!["4.3.0", "3.5.0", "2.14.0"]);
    assert_eq!(factory.get_latest_version().await.unwrap().to_string(), "4.3.0");
}

#[rstest]
#[case("2.14.0")]
#[case("4.3.0")]
#[case("5.8.0")]
#[tokio::test]
async fn nearest_framework_for_net451(#[case] version: &str) {
    let (_temp_dir, factory) = create_test_factory(&[(version, "net45")]);
    let service = factory.get_service(version).await.unwrap().unwrap();

    let output = service
        .get_nearest_framework(GetNearestFrameworkInput {
            project: some("net451"),
            package: some("net40\nnet45\nnetstandard1.6\nportable-net45+net-cf"),
        })
        .unwrap();

    assert_eq!(output.input_status, InputStatus::Valid);
    assert_eq!(output.invalid, vec!["portable-net45+net-cf"]);
    let compatible: Vec<&str> = output.compatible.iter().map(|f| f.short_folder_name()).collect();
    assert_eq!(compatible, vec!["net40", "net45"]);
    assert_eq!(output.nearest.unwrap().short_folder_name(), "net45");
}

#[rstest]
#[case("2.14.0", "netstandard1.0", true)]
#[case("2.14.0", "netstandard1.3", false)]
#[case("4.3.0", "netstandard1.0", true)]
#[case("4.3.0", "netstandard1.3", false)]
#[tokio::test]
async fn net45_compatibility(#[case] version: &str, #[case] package: &str, #[case] expected: bool) {
    let (_temp_dir, factory) = create_test_factory(&[(version, "net45")]);
    let service = factory.get_service(version).await.unwrap().unwrap();

    let output = service
        .framework_compatibility(FrameworkCompatibilityInput {
            project: some("net45"),
            package: some(package),
        })
        .unwrap();

    assert_eq!(output.is_compatible, Some(expected));
}

#[rstest]
#[case("1.0", "2.0.0-beta", -1)]
#[case("2.0", "1.0.0-beta", 1)]
#[case("1", "1.0.0.0", 0)]
#[tokio::test]
async fn version_comparison_matches_across_generations(
    #[case] a: &str,
    #[case] b: &str,
    #[case] expected: i32,
) {
    let (_temp_dir, factory) = create_test_factory(&[("2.14.0", "net45"), ("4.3.0", "net45")]);

    for version in ["2.14.0", "4.3.0"] {
        let service = factory.get_service(version).await.unwrap().unwrap();
        let output = service
            .version_comparison(VersionComparisonInput {
                version_a: some(a),
                version_b: some(b),
            })
            .unwrap();
        assert_eq!(output.result, Some(expected), "release {}", version);
    }
}

#[rstest]
#[case("2.14.0")]
#[case("3.4.4")]
#[case("4.3.0")]
#[tokio::test]
async fn best_match_agrees_with_and_without_find_best_match(#[case] version: &str) {
    let (_temp_dir, factory) = create_test_factory(&[(version, "net45")]);
    let service = factory.get_service(version).await.unwrap().unwrap();

    let output = service
        .find_best_version_match(FindBestVersionMatchInput {
            version_range: some("[1.0.0, 2.0.0]"),
            versions: some("0.9.0\n1.5.0\n2.1.0\n"),
        })
        .unwrap();

    assert_eq!(output.best_match.unwrap().normalized_string(), "1.5.0");
    assert_eq!(output.ranked[0].normalized_string(), "1.5.0");
}

#[tokio::test]
async fn batch_with_mixed_lines_is_partially_valid() {
    let (_temp_dir, factory) = create_test_factory(&[("4.3.0", "net45")]);
    let service = factory.get_service("4.3.0").await.unwrap().unwrap();

    let output = service
        .find_best_version_match(FindBestVersionMatchInput {
            version_range: some("1.*"),
            versions: some("  1.0.0 \n\nnot.a.version\n1.2.0\n$$$"),
        })
        .unwrap();

    assert_eq!(output.input_status, InputStatus::Valid);
    assert_eq!(output.invalid, vec!["not.a.version", "$$$"]);
    assert_eq!(output.valid.len(), 2);
    assert_eq!(output.best_match.unwrap().normalized_string(), "1.2.0");
}

#[rstest]
#[case("2.14.0")]
#[case("4.3.0")]
#[case("5.8.0")]
#[tokio::test]
async fn framework_list_round_trips(#[case] version: &str) {
    let (_temp_dir, factory) = create_test_factory(&[(version, "net45")]);
    let service = factory.get_service(version).await.unwrap().unwrap();
    let list = factory.get_framework_list(version).await.unwrap().unwrap();

    assert!(!list.dot_net_framework_names.is_empty());
    for name in &list.dot_net_framework_names {
        let parsed = service.logic().framework.parse(name).unwrap();
        assert_eq!(parsed.dotnet_framework_name(), name);
    }
}

#[tokio::test]
async fn precedence_through_factory() {
    let (_temp_dir, factory) = create_test_factory(&[("4.3.0", "net45")]);
    let precedence = factory
        .get_framework_precedence_service("4.3.0")
        .await
        .unwrap()
        .unwrap();

    let output = precedence
        .frameworks(FrameworkPrecedenceInput {
            framework: some("net46"),
            exclude_portable: true,
            ..Default::default()
        })
        .unwrap();

    let names: Vec<&str> = output.precedence.iter().map(|f| f.short_folder_name()).collect();
    assert_eq!(&names[..3], &["net46", "net452", "net451"]);
}
