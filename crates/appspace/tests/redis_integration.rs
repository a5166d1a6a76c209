// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// Integration tests against a live Redis server.
//
// Run with:
//   APPSPACE_REDIS_HOST=localhost cargo test -p appspace --test redis_integration -- --ignored

#[cfg(feature = "redis-backend")]
mod redis_tests {
    use appspace::{AppSpace, Connection, ConnectionConfig, KVError, Ttl};
    use serial_test::serial;

    async fn test_app(name: &str) -> AppSpace {
        let mut config = ConnectionConfig::from_env().expect("invalid APPSPACE_* environment");
        config.backend = appspace::BackendType::Redis;
        let conn = Connection::from_config(&config)
            .await
            .expect("Failed to connect to Redis (ensure Redis is running)");
        let app = conn.namespace(name);
        app.delete_all().await.unwrap();
        app
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    #[serial]
    async fn test_redis_simple_values() {
        let app = test_app("appspace_it_values").await;

        app.save("greeting", "hello", None).await.unwrap();
        assert_eq!(app.load("greeting").await.unwrap(), Some("hello".to_string()));
        assert!(app.exists("greeting").await.unwrap());
        assert_eq!(app.get_ttl("greeting").await.unwrap(), Ttl::Persistent);

        app.delete("greeting").await.unwrap();
        assert_eq!(app.load("greeting").await.unwrap(), None);
        assert_eq!(app.get_ttl("greeting").await.unwrap(), Ttl::Missing);
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_redis_dict_merge_and_ttl() {
        let app = test_app("appspace_it_dict").await;

        app.save_dict("user", [("name", "Alice")], Some(60)).await.unwrap();
        app.save_dict("user", [("age", "30")], None).await.unwrap();

        let user = app.load_dict("user").await.unwrap();
        assert_eq!(user.len(), 2);
        assert_eq!(user["name"], "Alice");
        match app.get_ttl("user").await.unwrap() {
            Ttl::Expires(secs) => assert!(secs > 0 && secs <= 60),
            other => panic!("expected expiration, got {:?}", other),
        }

        app.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_redis_lists_and_expiration() {
        let app = test_app("appspace_it_lists").await;

        app.add_to_list("items", ["x"], None).await.unwrap();
        app.add_to_list("items", ["y", "z"], None).await.unwrap();
        assert_eq!(app.get_list("items").await.unwrap(), vec!["x", "y", "z"]);

        assert!(!app.set_expire("missing", 10).await.unwrap());
        assert!(app.set_expire("items", 10).await.unwrap());
        assert!(app.remove_expire("items").await.unwrap());
        assert_eq!(app.get_ttl("items").await.unwrap().as_seconds(), -1);

        app.clear_list("items").await.unwrap();
        assert!(app.get_list("items").await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_redis_wrong_type_is_backend_error() {
        let app = test_app("appspace_it_types").await;

        app.save("scalar", "v", None).await.unwrap();
        let result = app.add_to_list("scalar", ["x"], None).await;
        assert!(matches!(result, Err(KVError::BackendError(_))));

        app.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_redis_namespace_maintenance() {
        let app1 = test_app("appspace_it_ns1").await;
        let app2 = test_app("appspace_it_ns2").await;

        app1.save("counter", 1, None).await.unwrap();
        app1.save_dict("user", [("name", "Alice")], None).await.unwrap();
        app1.add_to_list("items", ["a"], None).await.unwrap();
        app2.save("counter", 2, None).await.unwrap();

        assert_eq!(app1.list_all().await.unwrap(), vec!["counter", "items", "user"]);
        assert_eq!(app1.delete_all().await.unwrap(), 3);
        assert!(app1.list_all().await.unwrap().is_empty());
        assert_eq!(app2.load("counter").await.unwrap(), Some("2".to_string()));

        app2.delete_all().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    #[serial]
    async fn test_redis_unreachable_server() {
        let result = Connection::connect("127.0.0.1", 1, None).await;
        assert!(matches!(result, Err(KVError::BackendError(_))));
    }
}
