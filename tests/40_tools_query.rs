mod common;

use anyhow::Result;
use reqwest::StatusCode;

use common::{names, TestServer};
use devops_control_plane::database::models::NewTool;

async fn catalog() -> Result<TestServer> {
    TestServer::start(vec![
        (NewTool::new("Jenkins").category("ci-cd").tags(["cicd", "pipelines"]), 0),
        (NewTool::new("Prometheus").category("observability").tags(["metrics"]), 5),
        (NewTool::new("Grafana").category("observability").tags(["dashboards"]).description("Dashboards for metrics"), 10),
        (NewTool::new("ArgoCD").category("ci-cd").tags(["gitops", "cicd"]), 15),
        (NewTool::new("Terraform").category("iac").tags(["aws", "gcp"]), 20),
    ])
    .await
}

#[tokio::test]
async fn sorts_by_multiple_columns() -> Result<()> {
    let server = TestServer::start(vec![
        (NewTool::new("bb").category("x"), 0),
        (NewTool::new("aa").category("x"), 0),
        (NewTool::new("aa").category("y"), 0),
    ])
    .await?;

    let (status, body) = server.list(&[("sort", "category:asc,name:asc")]).await?;
    assert_eq!(status, StatusCode::OK);

    let order: Vec<(String, String)> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| (t["name"].as_str().unwrap().to_string(), t["category"].as_str().unwrap().to_string()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("aa".to_string(), "x".to_string()),
            ("bb".to_string(), "x".to_string()),
            ("aa".to_string(), "y".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn default_listing_is_newest_first() -> Result<()> {
    let server = catalog().await?;

    let (status, body) = server.list(&[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Terraform", "ArgoCD", "Grafana", "Prometheus", "Jenkins"]);
    assert_eq!(body["total"], 5);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["offset"], 0);
    Ok(())
}

#[tokio::test]
async fn invalid_sort_specs_are_rejected() -> Result<()> {
    let server = catalog().await?;

    for spec in [
        "name:asc,name:desc",
        "price:asc",
        "name:asc,category:asc,created_at:desc,name:desc",
        "name",
        "name:up",
        "name:asc,,category:asc",
    ] {
        let (status, body) = server.list(&[("sort", spec)]).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", spec);
        assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
        assert!(body["field_errors"]["sort"].is_string(), "{}: {}", spec, body);
    }
    Ok(())
}

#[tokio::test]
async fn invalid_pagination_is_rejected() -> Result<()> {
    let server = catalog().await?;

    for (param, value) in [("limit", "0"), ("limit", "-1"), ("limit", "100000"), ("limit", "ten"), ("offset", "-5")] {
        let (status, body) = server.list(&[(param, value)]).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}={}", param, value);
        assert!(body["field_errors"][param].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn pagination_reports_full_total() -> Result<()> {
    let server = catalog().await?;

    let (_, first) = server.list(&[("sort", "name:asc"), ("limit", "2")]).await?;
    let (_, second) = server.list(&[("sort", "name:asc"), ("limit", "2"), ("offset", "2")]).await?;
    assert_eq!(names(&first), vec!["ArgoCD", "Grafana"]);
    assert_eq!(names(&second), vec!["Jenkins", "Prometheus"]);
    assert_eq!(first["total"], 5);
    assert_eq!(second["total"], 5);

    let (status, past_end) = server.list(&[("offset", "50")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&past_end), Vec::<String>::new());
    assert_eq!(past_end["total"], 5);
    Ok(())
}

#[tokio::test]
async fn filters_are_combined() -> Result<()> {
    let server = catalog().await?;

    let (_, body) = server.list(&[("tag", "cicd"), ("sort", "name:asc")]).await?;
    assert_eq!(names(&body), vec!["ArgoCD", "Jenkins"]);

    let (_, body) = server.list(&[("tag", "cic")]).await?;
    assert_eq!(body["total"], 0);

    let (_, body) = server.list(&[("category", "observability"), ("q", "METRICS")]).await?;
    assert_eq!(names(&body), vec!["Grafana"]);
    Ok(())
}

#[tokio::test]
async fn legacy_sort_matches_modern_form() -> Result<()> {
    let server = catalog().await?;

    let (_, legacy) = server.list(&[("sort_by", "name"), ("sort_dir", "desc")]).await?;
    let (_, modern) = server.list(&[("sort", "name:desc")]).await?;
    assert_eq!(names(&legacy), names(&modern));

    let (status, _) = server.list(&[("sort_by", "price")]).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn lists_distinct_categories_and_tags() -> Result<()> {
    let server = catalog().await?;

    let categories: Vec<String> = server.authed_get("/api/tools/categories").send().await?.json().await?;
    assert_eq!(categories, vec!["ci-cd", "iac", "observability"]);

    let tags: Vec<String> = server.authed_get("/api/tools/tags").send().await?.json().await?;
    assert_eq!(tags, vec!["aws", "cicd", "dashboards", "gcp", "gitops", "metrics", "pipelines"]);
    Ok(())
}

#[tokio::test]
async fn malformed_query_string_is_unprocessable() -> Result<()> {
    let server = catalog().await?;

    let (status, body) = server.list(&[("limit", "5"), ("limit", "10")]).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "UNPROCESSABLE_ENTITY");
    assert!(body["field_errors"]["query"].is_string());
    Ok(())
}
