//! End-to-end session tests against an in-process fake gateway.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::BytesMut;
use gatelink::{
    event_tags, request_tags, Contract, EventHandler, FieldValue, Frame, GatewayClient,
    GatewayConfig, Order, OrderAction, RequestOutcome, SessionState,
};
use rust_decimal_macros::dec;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Default)]
struct State {
    times: Vec<i64>,
    depth_prices: Vec<f64>,
    tick_prices: Vec<f64>,
    closed: Vec<String>,
    order_statuses: Vec<(i64, String)>,
    order_id_seeds: Vec<i64>,
}

#[derive(Clone, Default)]
struct TestHandler(Arc<Mutex<State>>);

impl EventHandler for TestHandler {
    fn current_time(&mut self, time: chrono::DateTime<chrono::Utc>) {
        self.0.lock().unwrap().times.push(time.timestamp());
    }

    fn market_depth_update(
        &mut self,
        _request_id: i64,
        _position: i64,
        _operation: gatelink::DepthOperation,
        _side: gatelink::DepthSide,
        price: f64,
        _size: rust_decimal::Decimal,
    ) {
        self.0.lock().unwrap().depth_prices.push(price);
    }

    fn tick_price(&mut self, _request_id: i64, _tick_type: i64, price: f64, _can_auto_execute: bool) {
        self.0.lock().unwrap().tick_prices.push(price);
    }

    fn connection_closed(&mut self, reason: &str) {
        self.0.lock().unwrap().closed.push(reason.to_string());
    }

    fn next_valid_order_id(&mut self, order_id: i64) {
        self.0.lock().unwrap().order_id_seeds.push(order_id);
    }

    fn order_status(
        &mut self,
        order_id: i64,
        status: &str,
        _filled: rust_decimal::Decimal,
        _remaining: rust_decimal::Decimal,
        _avg_fill_price: f64,
        _last_fill_price: f64,
        _why_held: &str,
    ) {
        self.0
            .lock()
            .unwrap()
            .order_statuses
            .push((order_id, status.to_string()));
    }
}

async fn read_frame(stream: &mut TcpStream, buf: &mut BytesMut) -> Option<Frame> {
    loop {
        if let Some(frame) = Frame::parse(buf, 1024 * 1024).unwrap() {
            return Some(frame);
        }
        if stream.read_buf(buf).await.unwrap() == 0 {
            return None;
        }
    }
}

async fn send(stream: &mut TcpStream, frame: Frame) {
    stream.write_all(&frame.encode()).await.unwrap();
}

/// Accepts one client, validates its hello and answers with the
/// acknowledgment plus the order id announcement.
async fn accept_and_handshake(
    listener: &TcpListener,
    server_version: i64,
    next_order_id: i64,
) -> (TcpStream, BytesMut) {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut buf = BytesMut::new();
    let hello = read_frame(&mut stream, &mut buf).await.unwrap();
    assert_eq!(hello.tag, request_tags::CLIENT_HELLO);
    send(
        &mut stream,
        Frame::new(event_tags::CONNECT_ACK, vec![FieldValue::Int(server_version)]),
    )
    .await;
    send(
        &mut stream,
        Frame::new(
            event_tags::NEXT_VALID_ORDER_ID,
            vec![FieldValue::Int(next_order_id)],
        ),
    )
    .await;
    (stream, buf)
}

async fn local_setup() -> (TcpListener, GatewayConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = GatewayConfig::default();
    config.network.port = listener.local_addr().unwrap().port();
    (listener, config)
}

async fn pump_until<F: Fn() -> bool>(client: &GatewayClient, pred: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !pred() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached before deadline"
        );
        client.process_events(Some(Duration::from_millis(20))).await;
    }
}

fn depth_frame(request_id: i64, price: f64) -> Frame {
    Frame::new(
        event_tags::MARKET_DEPTH_UPDATE,
        vec![
            FieldValue::Int(request_id),
            FieldValue::Int(0),
            FieldValue::Int(0),
            FieldValue::Int(1),
            FieldValue::Float(price),
            FieldValue::Decimal(dec!(200)),
        ],
    )
}

#[tokio::test]
async fn test_current_time_round_trip() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        let request = read_frame(&mut stream, &mut buf).await.unwrap();
        assert_eq!(request.tag, request_tags::CURRENT_TIME);
        send(
            &mut stream,
            Frame::new(event_tags::CURRENT_TIME, vec![FieldValue::Int(1_700_000_000)]),
        )
        .await;
        stream
    });

    client.connect().await.unwrap();
    client.req_current_time().await.unwrap();
    pump_until(&client, || !handler.0.lock().unwrap().times.is_empty()).await;
    assert_eq!(handler.0.lock().unwrap().times, vec![1_700_000_000]);

    client.disconnect().await.unwrap();
    assert_eq!(client.state(), SessionState::Disconnected);
    drop(gateway);
}

#[tokio::test]
async fn test_depth_stream_completes_and_drops_late_frames() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        let request = read_frame(&mut stream, &mut buf).await.unwrap();
        assert_eq!(request.tag, request_tags::MARKET_DEPTH);
        let request_id = match &request.fields[0] {
            FieldValue::Int(id) => *id,
            other => panic!("unexpected id field: {:?}", other),
        };
        for price in [99.1, 99.2, 99.3] {
            send(&mut stream, depth_frame(request_id, price)).await;
        }
        send(
            &mut stream,
            Frame::new(
                event_tags::MARKET_DEPTH_END,
                vec![FieldValue::Int(request_id)],
            ),
        )
        .await;
        // a straggler after the stream ended, then a marker to sync on
        send(&mut stream, depth_frame(request_id, 99.9)).await;
        send(
            &mut stream,
            Frame::new(event_tags::CURRENT_TIME, vec![FieldValue::Int(1)]),
        )
        .await;
        stream
    });

    client.connect().await.unwrap();
    let (_, handle) = client
        .req_market_depth(Contract::stock("AAPL"), 10)
        .await
        .unwrap();
    pump_until(&client, || !handler.0.lock().unwrap().times.is_empty()).await;
    assert_eq!(handle.outcome().await.unwrap(), RequestOutcome::Completed);
    // updates arrived in order and the straggler never reached the handler
    assert_eq!(
        handler.0.lock().unwrap().depth_prices,
        vec![99.1, 99.2, 99.3]
    );

    client.disconnect().await.unwrap();
    drop(gateway);
}

#[tokio::test]
async fn test_remote_close_aborts_pending_requests() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        // swallow both requests, then drop the connection
        read_frame(&mut stream, &mut buf).await.unwrap();
        read_frame(&mut stream, &mut buf).await.unwrap();
    });

    client.connect().await.unwrap();
    let (_, first) = client
        .req_market_data(Contract::stock("IBM"), false)
        .await
        .unwrap();
    let (_, second) = client
        .req_account_summary("All".into(), "NetLiquidation".into())
        .await
        .unwrap();
    gateway.await.unwrap();

    client.run_until_closed().await;
    assert_eq!(first.outcome().await.unwrap(), RequestOutcome::Aborted);
    assert_eq!(second.outcome().await.unwrap(), RequestOutcome::Aborted);
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(handler.0.lock().unwrap().closed.len(), 1);
}

#[tokio::test]
async fn test_tick_stream_preserves_arrival_order() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        let request = read_frame(&mut stream, &mut buf).await.unwrap();
        let request_id = match &request.fields[0] {
            FieldValue::Int(id) => *id,
            other => panic!("unexpected id field: {:?}", other),
        };
        for i in 0..50 {
            send(
                &mut stream,
                Frame::new(
                    event_tags::TICK_PRICE,
                    vec![
                        FieldValue::Int(request_id),
                        FieldValue::Int(4),
                        FieldValue::Float(100.0 + i as f64),
                        FieldValue::Bool(false),
                    ],
                ),
            )
            .await;
        }
        stream
    });

    client.connect().await.unwrap();
    client
        .req_market_data(Contract::stock("MSFT"), false)
        .await
        .unwrap();
    pump_until(&client, || handler.0.lock().unwrap().tick_prices.len() == 50).await;
    let prices = handler.0.lock().unwrap().tick_prices.clone();
    assert!(prices.windows(2).all(|w| w[0] < w[1]));

    client.disconnect().await.unwrap();
    drop(gateway);
}

#[tokio::test]
async fn test_order_ids_are_seeded_and_orders_complete_on_fill() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 90).await;
        let request = read_frame(&mut stream, &mut buf).await.unwrap();
        assert_eq!(request.tag, request_tags::PLACE_ORDER);
        let order_id = match &request.fields[0] {
            FieldValue::Int(id) => *id,
            other => panic!("unexpected id field: {:?}", other),
        };
        assert_eq!(order_id, 90);
        send(
            &mut stream,
            Frame::new(
                event_tags::ORDER_STATUS,
                vec![
                    FieldValue::Int(order_id),
                    FieldValue::Str("Filled".into()),
                    FieldValue::Decimal(dec!(5)),
                    FieldValue::Decimal(dec!(0)),
                    FieldValue::Float(101.5),
                    FieldValue::Float(101.5),
                    FieldValue::Str("".into()),
                ],
            ),
        )
        .await;
        stream
    });

    client.connect().await.unwrap();
    // order id space is seeded by the announcement behind the handshake
    pump_until(&client, || {
        !handler.0.lock().unwrap().order_id_seeds.is_empty()
    })
    .await;
    let (order_id, handle) = client
        .place_order(
            Contract::stock("IBM"),
            Order::market(OrderAction::Buy, dec!(5)),
        )
        .await
        .unwrap();
    assert_eq!(order_id, 90);
    pump_until(&client, || {
        !handler.0.lock().unwrap().order_statuses.is_empty()
    })
    .await;
    assert_eq!(handle.outcome().await.unwrap(), RequestOutcome::Completed);
    assert_eq!(
        handler.0.lock().unwrap().order_statuses,
        vec![(90, "Filled".to_string())]
    );

    client.disconnect().await.unwrap();
    drop(gateway);
}

#[tokio::test]
async fn test_version_outside_supported_range_fails_handshake() {
    let (listener, config) = local_setup().await;
    let client = GatewayClient::new(config, Box::new(TestHandler::default()));

    let gateway = tokio::spawn(async move {
        let (stream, _) = accept_and_handshake(&listener, 999, 1).await;
        stream
    });

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, gatelink::AppError::UnsupportedVersion(999)));
    assert_eq!(client.state(), SessionState::Disconnected);
    drop(gateway);
}

#[tokio::test]
async fn test_requests_fail_fast_when_not_connected() {
    let (_listener, config) = local_setup().await;
    let client = GatewayClient::new(config, Box::new(TestHandler::default()));

    let err = client.req_current_time().await.unwrap_err();
    assert!(matches!(err, gatelink::AppError::NotConnected));
    let err = client
        .req_market_data(Contract::stock("IBM"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, gatelink::AppError::NotConnected));
    // the failed request must not leave a pending entry behind
    assert_eq!(client.correlator().pending_count(), 0);
}

#[tokio::test]
async fn test_concurrent_senders_never_interleave_frames() {
    let (listener, config) = local_setup().await;
    let client = Arc::new(GatewayClient::new(config, Box::new(TestHandler::default())));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        // every frame must come off the wire intact; interleaved writes
        // would desynchronize the parser here
        let mut symbols = Vec::new();
        for _ in 0..40 {
            let request = read_frame(&mut stream, &mut buf).await.unwrap();
            assert_eq!(request.tag, request_tags::MARKET_DATA);
            match &request.fields[1] {
                FieldValue::Str(symbol) => symbols.push(symbol.clone()),
                other => panic!("unexpected symbol field: {:?}", other),
            }
        }
        symbols
    });

    client.connect().await.unwrap();
    let mut senders = Vec::new();
    for task in 0..4 {
        let client = client.clone();
        senders.push(tokio::spawn(async move {
            for i in 0..10 {
                client
                    .req_market_data(Contract::stock(&format!("SYM{}-{}", task, i)), false)
                    .await
                    .unwrap();
            }
        }));
    }
    for sender in senders {
        sender.await.unwrap();
    }
    let symbols = gateway.await.unwrap();
    assert_eq!(symbols.len(), 40);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_local_cancel_resolves_handle_without_gateway_reply() {
    let (listener, config) = local_setup().await;
    let handler = TestHandler::default();
    let client = GatewayClient::new(config, Box::new(handler.clone()));

    let gateway = tokio::spawn(async move {
        let (mut stream, mut buf) = accept_and_handshake(&listener, 142, 1).await;
        read_frame(&mut stream, &mut buf).await.unwrap();
        read_frame(&mut stream, &mut buf).await.unwrap();
        stream
    });

    client.connect().await.unwrap();
    let (request_id, handle) = client
        .req_real_time_bars(Contract::stock("IBM"), 5, "TRADES".into())
        .await
        .unwrap();
    client.cancel_real_time_bars(request_id).await.unwrap();
    assert_eq!(handle.outcome().await.unwrap(), RequestOutcome::Cancelled);
    // canceling again is a no-op
    client.cancel_real_time_bars(request_id).await.unwrap();

    client.disconnect().await.unwrap();
    drop(gateway);
}
