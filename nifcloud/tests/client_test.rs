//! End-to-end request cycle against a local mock endpoint.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nifcloud::{Error, Session};

fn mock_client(server: &MockServer, service: &str) -> nifcloud::Client {
    Session::new()
        .client(service)
        .endpoint_url(server.uri())
        .nifcloud_access_key_id("AKID")
        .nifcloud_secret_access_key("secret")
        .build()
        .expect("client builds")
}

#[tokio::test]
async fn describe_instances_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<DescribeInstancesResponse>
                <requestId>f6dd8353-eb6b-6b4fd32e4f05</requestId>
                <reservationSet>
                    <item>
                        <reservationId></reservationId>
                        <instancesSet>
                            <item>
                                <instanceId>web01</instanceId>
                                <instanceType>mini</instanceType>
                                <instanceState><code>16</code><name>running</name></instanceState>
                                <launchTime>2024-01-02T03:04:05Z</launchTime>
                            </item>
                        </instancesSet>
                    </item>
                </reservationSet>
            </DescribeInstancesResponse>"#,
        ))
        .mount(&server)
        .await;

    let client = mock_client(&server, "computing");
    let response = client
        .call("DescribeInstances", json!({"InstanceIds": ["web01"]}))
        .await
        .expect("call succeeds");

    let instance = &response["ReservationSet"][0]["InstancesSet"][0];
    assert_eq!(instance["InstanceId"], json!("web01"));
    assert_eq!(instance["InstanceState"]["Code"], json!(16));
    assert_eq!(instance["LaunchTime"], json!("2024-01-02T03:04:05Z"));
    assert_eq!(
        response["ResponseMetadata"]["RequestId"],
        json!("f6dd8353-eb6b-6b4fd32e4f05")
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("Action=DescribeInstances"));
    assert!(body.contains("InstanceId.1=web01"));
    // The auth adapter renames the credential identifier before signing.
    assert!(body.contains("AccessKeyId=AKID"));
    assert!(!body.contains("AWSAccessKeyId"));
    assert!(body.contains("Signature="));
    assert!(body.contains("SignatureVersion=2"));
}

#[tokio::test]
async fn empty_optional_fields_parse_as_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<DescribeInstancesResponse>
                <reservationSet>
                    <item>
                        <instancesSet>
                            <item>
                                <instanceId>web01</instanceId>
                                <launchTime></launchTime>
                                <instanceState><code></code><name></name></instanceState>
                            </item>
                        </instancesSet>
                    </item>
                </reservationSet>
            </DescribeInstancesResponse>"#,
        ))
        .mount(&server)
        .await;

    let client = mock_client(&server, "computing");
    let response = client
        .call("DescribeInstances", json!({}))
        .await
        .expect("call succeeds");
    let instance = &response["ReservationSet"][0]["InstancesSet"][0];
    assert_eq!(instance["LaunchTime"], Value::Null);
    assert_eq!(instance["InstanceState"]["Code"], Value::Null);
    assert_eq!(instance["InstanceState"]["Name"], json!(""));
}

#[tokio::test]
async fn api_error_envelope_surfaces_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"<Response>
                <Errors>
                    <Error>
                        <Code>Client.InvalidParameterNotFound.Instance</Code>
                        <Message>The instanceId 'missing' does not exist.</Message>
                    </Error>
                </Errors>
                <RequestID>req-err-1</RequestID>
            </Response>"#,
        ))
        .mount(&server)
        .await;

    let client = mock_client(&server, "computing");
    let err = client
        .call("DescribeInstances", json!({}))
        .await
        .unwrap_err();
    match err {
        Error::Api {
            service,
            code,
            status_code,
            request_id,
            ..
        } => {
            assert_eq!(service, "computing");
            assert_eq!(code, "Client.InvalidParameterNotFound.Instance");
            assert_eq!(status_code, 400);
            assert_eq!(request_id.as_deref(), Some("req-err-1"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn metric_statistics_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<NiftyGetMetricStatisticsResponse>
                <NiftyGetMetricStatisticsResult>
                    <Label>FreeStorageSpace</Label>
                    <Datapoints>
                        <member>
                            <Timestamp>2024-01-02T03:04:00Z</Timestamp>
                            <SampleCount>1</SampleCount>
                            <Average>1024.5</Average>
                        </member>
                    </Datapoints>
                </NiftyGetMetricStatisticsResult>
                <ResponseMetadata><RequestId>req-m-1</RequestId></ResponseMetadata>
            </NiftyGetMetricStatisticsResponse>"#,
        ))
        .mount(&server)
        .await;

    let client = mock_client(&server, "rdb");
    let response = client
        .call(
            "NiftyGetMetricStatistics",
            json!({
                "Dimensions": [{"Name": "DBInstanceIdentifier", "Value": "db01"}],
                "MetricName": "FreeStorageSpace",
                "StartTime": "2024-01-02T03:04:05Z",
                "EndTime": "2024-01-02T04:04:05Z"
            }),
        )
        .await
        .expect("call succeeds");

    assert_eq!(response["Label"], json!("FreeStorageSpace"));
    assert_eq!(response["Datapoints"][0]["Average"], json!(1024.5));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    // Start/end times are re-rendered with a space separator and no
    // seconds, percent-encoded in the form body.
    assert!(body.contains("StartTime=2024-01-02%2003%3A04"));
    assert!(body.contains("EndTime=2024-01-02%2004%3A04"));
    assert!(body.contains("Dimensions.member.1.Name=DBInstanceIdentifier"));
}

#[tokio::test]
async fn dns_list_hosted_zones_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2012-12-12N2013-12-16/hostedzone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ListHostedZonesResponse xmlns="https://route53.amazonaws.com/doc/2012-12-12/">
                <HostedZones>
                    <HostedZone>
                        <Id>example.jp</Id>
                        <Name>example.jp</Name>
                        <CallerReference>ref-1</CallerReference>
                    </HostedZone>
                </HostedZones>
                <IsTruncated>false</IsTruncated>
            </ListHostedZonesResponse>"#,
        ))
        .mount(&server)
        .await;

    let client = mock_client(&server, "dns");
    let response = client
        .call("ListHostedZones", json!({}))
        .await
        .expect("call succeeds");
    assert_eq!(response["HostedZones"][0]["Name"], json!("example.jp"));
    assert_eq!(response["IsTruncated"], json!(false));
}
