#[cfg(test)]
mod tests {
    use crate::{recent_query, Database, SENTIMENT_TABLE};
    use chrono::{TimeZone, Utc};
    use stonks_core::testing::{CannedResponse, CannedServer};
    use stonks_core::{
        CoreError, DatabaseConfig, DatabaseError, SentimentRecord, SentimentRow,
    };
    use url::Url;

    fn test_config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: Url::parse(url).unwrap(),
            service_key: "service-role-key".to_string(),
        }
    }

    #[test]
    fn test_table_url_from_project_root() {
        let db = Database::new(&test_config("https://project.supabase.co")).unwrap();
        assert_eq!(db.table(), SENTIMENT_TABLE);
        assert_eq!(
            db.table_url().unwrap().as_str(),
            "https://project.supabase.co/rest/v1/reddit_sentiment"
        );
    }

    #[test]
    fn test_table_url_keeps_path_prefix() {
        let db = Database::with_table(&test_config("http://localhost:54321/proxy"), "snapshots")
            .unwrap();
        assert_eq!(
            db.table_url().unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/snapshots"
        );
    }

    #[test]
    fn test_recent_query_filters_and_orders() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let query = recent_query(since, 50);

        let get = |name: &str| {
            query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        assert_eq!(get("timestamp").as_deref(), Some("gte.2024-03-01T12:00:00.000Z"));
        assert_eq!(get("order").as_deref(), Some("mention_count.desc"));
        assert_eq!(get("limit").as_deref(), Some("50"));
        assert!(get("select").unwrap().contains("sentiment_label"));
    }

    fn gme_record() -> SentimentRecord {
        SentimentRecord {
            symbol: "GME".to_string(),
            sentiment_score: 0.8,
            sentiment_label: "Bullish".to_string(),
            mention_count: 120,
            source: "wallstreetbets".to_string(),
            timestamp: "2024-03-01T12:00:00.000000Z".to_string(),
            raw_data: serde_json::json!({"ticker": "GME"}),
        }
    }

    async fn database_for(responses: Vec<CannedResponse>) -> (CannedServer, Database) {
        let server = CannedServer::start(responses).await.unwrap();
        let db = Database::new(&test_config(server.base_url())).unwrap();
        (server, db)
    }

    #[test]
    fn test_sentiment_record_row_shape() {
        let row = serde_json::to_value(gme_record()).unwrap();
        let columns: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        for column in [
            "symbol",
            "sentiment_score",
            "sentiment_label",
            "mention_count",
            "source",
            "timestamp",
            "raw_data",
        ] {
            assert!(columns.contains(&column), "missing column {column}");
        }
        assert_eq!(row["raw_data"]["ticker"], "GME");
    }

    #[test]
    fn test_selected_rows_deserialize() {
        let rows: Vec<SentimentRow> = serde_json::from_str(
            r#"[{"symbol":"TSLA","sentiment_label":"Bearish","sentiment_score":-0.12,
                 "mention_count":33,"timestamp":"2024-03-01T11:00:00+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].symbol, "TSLA");
        assert_eq!(rows[0].mention_count, 33);
    }

    #[tokio::test]
    async fn test_insert_against_unreachable_host_fails() {
        let db = Database::new(&test_config("http://127.0.0.1:9")).unwrap();
        let result = db.insert_rows(&[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_insert_posts_batch_with_service_key() {
        let (server, db) = database_for(vec![CannedResponse::json(201, "")]).await;

        db.insert_rows(&[gme_record()]).await.unwrap();

        let request = server.requests().remove(0);
        let lowered = request.to_lowercase();
        assert!(request.starts_with("POST /rest/v1/reddit_sentiment "));
        assert!(lowered.contains("apikey: service-role-key"));
        assert!(lowered.contains("authorization: bearer service-role-key"));
        assert!(lowered.contains("prefer: return=minimal"));
        assert!(request.contains(r#""symbol":"GME""#));
    }

    #[tokio::test]
    async fn test_rejected_key_maps_to_unauthorized() {
        for status in [401, 403] {
            let (_server, db) = database_for(vec![CannedResponse::json(
                status,
                r#"{"message":"Invalid API key"}"#,
            )])
            .await;

            match db.insert_rows(&[gme_record()]).await {
                Err(CoreError::Database(DatabaseError::Unauthorized { table })) => {
                    assert_eq!(table, SENTIMENT_TABLE)
                }
                other => panic!("status {status}: unexpected result {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_insert_failure_keeps_status_and_body() {
        let (_server, db) = database_for(vec![CannedResponse::json(
            409,
            r#"{"message":"duplicate key"}"#,
        )])
        .await;

        match db.insert_rows(&[gme_record()]).await {
            Err(CoreError::Database(DatabaseError::InsertFailed {
                status_code,
                message,
                ..
            })) => {
                assert_eq!(status_code, 409);
                assert!(message.contains("duplicate key"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_select_recent_sends_filters_and_decodes_rows() {
        let (server, db) = database_for(vec![CannedResponse::json(
            200,
            r#"[{"symbol":"GME","sentiment_label":"Bullish","sentiment_score":0.8,
                 "mention_count":120,"timestamp":"2024-03-01T12:00:00+00:00"}]"#,
        )])
        .await;
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let rows = db.select_recent(since, 50).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].mention_count, 120);

        let request_line = server.requests().remove(0);
        let request_line = request_line.lines().next().unwrap().to_string();
        assert!(request_line.starts_with("GET /rest/v1/reddit_sentiment?"));
        assert!(request_line.contains("order=mention_count.desc"));
        assert!(request_line.contains("limit=50"));
    }

    #[tokio::test]
    async fn test_select_failure_is_query_failed() {
        let (_server, db) =
            database_for(vec![CannedResponse::json(400, r#"{"message":"bad filter"}"#)]).await;
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert!(matches!(
            db.select_recent(since, 50).await,
            Err(CoreError::Database(DatabaseError::QueryFailed {
                status_code: 400,
                ..
            }))
        ));
    }
}
