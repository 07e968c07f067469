//! HTTP-level tests for the SOAP transport against a local mock device

use mockito::{Matcher, Server};
use soap_client::{SoapClient, SoapError};

fn client_for(server: &Server) -> SoapClient {
    SoapClient::new().with_port(server.socket_address().port())
}

#[test]
fn test_call_posts_envelope_with_soap_action() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/MediaServer/ContentDirectory/Control")
        .match_header(
            "soapaction",
            "\"urn:schemas-upnp-org:service:ContentDirectory:1#Browse\"",
        )
        .match_body(Matcher::Regex("<ObjectID>Q:0</ObjectID>".to_string()))
        .with_status(200)
        .with_body(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1">
                        <Result></Result>
                        <NumberReturned>0</NumberReturned>
                        <TotalMatches>0</TotalMatches>
                        <UpdateID>7</UpdateID>
                    </u:BrowseResponse>
                </s:Body>
            </s:Envelope>"#,
        )
        .create();

    let response = client_for(&server)
        .call(
            "127.0.0.1",
            "MediaServer/ContentDirectory/Control",
            "urn:schemas-upnp-org:service:ContentDirectory:1",
            "Browse",
            "<ObjectID>Q:0</ObjectID>",
        )
        .expect("browse call should succeed");

    mock.assert();
    assert_eq!(response.name, "BrowseResponse");
    assert_eq!(
        response.get_child("UpdateID").and_then(|e| e.get_text()).as_deref(),
        Some("7")
    );
}

#[test]
fn test_call_maps_http_500_fault_to_fault_code() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/MediaRenderer/AVTransport/Control")
        .with_status(500)
        .with_body(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>402</errorCode>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>"#,
        )
        .create();

    let result = client_for(&server).call(
        "127.0.0.1",
        "MediaRenderer/AVTransport/Control",
        "urn:schemas-upnp-org:service:AVTransport:1",
        "AddURIToSavedQueue",
        "",
    );

    assert!(matches!(result, Err(SoapError::Fault(402))));
}

#[test]
fn test_fetch_returns_document_body() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/status/topology")
        .with_status(200)
        .with_body("<ZPSupportInfo><ZonePlayers/></ZPSupportInfo>")
        .create();

    let body = client_for(&server)
        .fetch("127.0.0.1", "/status/topology")
        .expect("fetch should succeed");

    assert!(body.contains("ZonePlayers"));
}

#[test]
fn test_fetch_reports_missing_document_as_network_error() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/status/topology").with_status(404).create();

    let result = client_for(&server).fetch("127.0.0.1", "/status/topology");

    assert!(matches!(result, Err(SoapError::Network(_))));
}
