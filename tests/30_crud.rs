mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn role_lifecycle() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .authed(Method::POST, "/role")
        .json(&json!({ "roleId": 10, "roleName": "Dispatcher", "roleDescription": "Routes tickets" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?["data"].clone();
    assert_eq!(created["roleName"], "Dispatcher");
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let res = app
        .authed(Method::POST, "/role")
        .json(&json!({ "roleId": 10, "roleName": "Duplicate" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Role with this ID already exists.");

    let res = app
        .authed(Method::PUT, "/role/10")
        .json(&json!({ "roleId": 10, "roleName": "Senior Dispatcher" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = app.authed(Method::GET, "/role/10").send().await?;
    let role = res.json::<Value>().await?["data"].clone();
    assert_eq!(role["roleName"], "Senior Dispatcher");
    assert_eq!(role["createdAt"], created["createdAt"]);
    assert_ne!(role["updatedAt"], created["updatedAt"]);
    Ok(())
}

#[tokio::test]
async fn role_update_checks_id_and_existence() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .authed(Method::PUT, "/role/1")
        .json(&json!({ "roleId": 2, "roleName": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Role ID mismatch.");

    let res = app
        .authed(Method::PUT, "/role/1")
        .json(&json!({ "roleId": 1, "roleName": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn permissions_filter_by_system() -> Result<()> {
    let app = common::spawn_app().await?;
    common::seed_permission(&app.store, 1, "a", 1).await?;
    common::seed_permission(&app.store, 2, "b", 2).await?;
    common::seed_permission(&app.store, 3, "c", 1).await?;

    let res = app.authed(Method::GET, "/permission/system/1").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ids: Vec<i64> = res.json::<Value>().await?["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["permissionId"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec![1, 3]);

    let res = app.authed(Method::GET, "/permission/all").send().await?;
    assert_eq!(res.json::<Value>().await?["data"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn duplicate_links_are_rejected() -> Result<()> {
    let app = common::spawn_app().await?;

    let emp_role = json!({ "empId": "E1", "roleId": 1, "systemId": 1 });
    let res = app.authed(Method::POST, "/emprole").json(&emp_role).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = app.authed(Method::POST, "/emprole").json(&emp_role).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "This employee-role association already exists."
    );

    let role_permission = json!({ "roleId": 1, "permissionId": 2, "systemId": 1 });
    let res = app.authed(Method::POST, "/rolepermission").json(&role_permission).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = app.authed(Method::POST, "/rolepermission").json(&role_permission).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json::<Value>().await?["message"],
        "This role-permission association already exists."
    );
    Ok(())
}

#[tokio::test]
async fn link_queries_filter_by_each_side() -> Result<()> {
    let app = common::spawn_app().await?;

    for (emp_id, role_id) in [("E1", 1), ("E1", 2), ("E2", 1)] {
        app.authed(Method::POST, "/emprole")
            .json(&json!({ "empId": emp_id, "roleId": role_id, "systemId": 1 }))
            .send()
            .await?;
    }
    for (role_id, permission_id) in [(1, 10), (1, 11), (2, 10)] {
        app.authed(Method::POST, "/rolepermission")
            .json(&json!({ "roleId": role_id, "permissionId": permission_id, "systemId": 1 }))
            .send()
            .await?;
    }

    let count = |body: Value| body["data"].as_array().map(Vec::len).unwrap_or_default();

    let res = app.authed(Method::GET, "/emprole/employee/E1").send().await?;
    assert_eq!(count(res.json().await?), 2);
    let res = app.authed(Method::GET, "/emprole/role/1").send().await?;
    assert_eq!(count(res.json().await?), 2);
    let res = app.authed(Method::GET, "/rolepermission/role/1").send().await?;
    assert_eq!(count(res.json().await?), 2);
    let res = app.authed(Method::GET, "/rolepermission/permission/10").send().await?;
    assert_eq!(count(res.json().await?), 2);
    let res = app.authed(Method::GET, "/rolepermission/all").send().await?;
    assert_eq!(count(res.json().await?), 3);
    Ok(())
}

#[tokio::test]
async fn api_storage_lifecycle() -> Result<()> {
    let app = common::spawn_app().await?;

    let res = app
        .authed(Method::POST, "/apistorage")
        .json(&json!({ "applicationName": "payroll", "apiSecret": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await?["data"]["id"].as_i64().unwrap_or_default();
    assert_eq!(id, 2);

    let res = app
        .authed(Method::PUT, &format!("/apistorage/{}", id))
        .json(&json!({ "id": 99, "applicationName": "payroll", "apiSecret": "pw2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .authed(Method::PUT, &format!("/apistorage/{}", id))
        .json(&json!({ "id": id, "applicationName": "payroll", "apiSecret": "pw2" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    // The new credentials work against the gate
    let res = app
        .anonymous(Method::GET, "/apistorage/all")
        .header("Application-Name", "payroll")
        .header("API-Key", "pw2")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.authed(Method::DELETE, &format!("/apistorage/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let res = app.authed(Method::DELETE, &format!("/apistorage/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
