//! Operations executed through the SOAP transport against a mock device

use mockito::{Matcher, Server};
use proptest::prelude::*;
use sonos_api::operation::push_element;
use sonos_api::services::av_transport::{
    AddURIToSavedQueueOperation, AddURIToSavedQueueOperationRequest, ReorderTracksInSavedQueueOperation,
    ReorderTracksInSavedQueueOperationRequest, QUEUE_OBJECT_ID,
};
use sonos_api::services::content_directory::{BrowseOperation, BrowseOperationRequest};
use sonos_api::{ApiError, SoapClient, SonosClient};

const AV_TRANSPORT: &str = "/MediaRenderer/AVTransport/Control";
const CONTENT_DIRECTORY: &str = "/MediaServer/ContentDirectory/Control";

fn client_for(server: &Server) -> SonosClient {
    SonosClient::with_soap_client(SoapClient::new().with_port(server.socket_address().port()))
}

fn envelope(body: &str) -> String {
    format!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>{}</s:Body></s:Envelope>"#,
        body
    )
}

#[test]
fn test_add_to_saved_queue_round_trip() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", AV_TRANSPORT)
        .match_header(
            "soapaction",
            "\"urn:schemas-upnp-org:service:AVTransport:1#AddURIToSavedQueue\"",
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<ObjectID>SQ:5</ObjectID>".to_string()),
            Matcher::Regex("<UpdateID>3</UpdateID>".to_string()),
            Matcher::Regex("<AddAtIndex>1</AddAtIndex>".to_string()),
        ]))
        .with_status(200)
        .with_body(envelope(
            r#"<u:AddURIToSavedQueueResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
                <NumTracksAdded>1</NumTracksAdded>
                <NewQueueLength>3</NewQueueLength>
                <NewUpdateID>4</NewUpdateID>
            </u:AddURIToSavedQueueResponse>"#,
        ))
        .create();

    let request = AddURIToSavedQueueOperationRequest {
        instance_id: 0,
        object_id: "SQ:5".to_string(),
        update_id: 3,
        enqueued_uri: "x-file-cifs://nas/a.mp3".to_string(),
        enqueued_uri_metadata: String::new(),
        add_at_index: 1,
    };
    let response = client_for(&server)
        .execute::<AddURIToSavedQueueOperation>("127.0.0.1", &request)
        .unwrap();

    mock.assert();
    assert_eq!(response.num_tracks_added, 1);
    assert_eq!(response.new_queue_length, 3);
    assert_eq!(response.new_update_id, 4);
}

#[test]
fn test_stale_update_id_fault() {
    let mut server = Server::new();
    server
        .mock("POST", AV_TRANSPORT)
        .with_status(500)
        .with_body(envelope(
            r#"<s:Fault>
                <faultcode>s:Client</faultcode>
                <faultstring>UPnPError</faultstring>
                <detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>800</errorCode></UPnPError></detail>
            </s:Fault>"#,
        ))
        .create();

    let request = ReorderTracksInSavedQueueOperationRequest::remove(QUEUE_OBJECT_ID, 1, &[0]);
    let result = client_for(&server).execute::<ReorderTracksInSavedQueueOperation>("127.0.0.1", &request);

    assert!(matches!(result, Err(ApiError::SoapFault(800))));
}

#[test]
fn test_browse_missing_update_id_is_parse_error() {
    let mut server = Server::new();
    server
        .mock("POST", CONTENT_DIRECTORY)
        .with_status(200)
        .with_body(envelope(
            "<u:BrowseResponse><Result></Result><NumberReturned>0</NumberReturned><TotalMatches>0</TotalMatches></u:BrowseResponse>",
        ))
        .create();

    let request = BrowseOperationRequest::direct_children(QUEUE_OBJECT_ID, 0, 100);
    let result = client_for(&server).execute::<BrowseOperation>("127.0.0.1", &request);

    assert!(matches!(result, Err(ApiError::ParseError(_))));
}

#[test]
fn test_unreachable_device_is_network_error() {
    let client = SonosClient::with_soap_client(SoapClient::new().with_port(1));
    let request = BrowseOperationRequest::metadata("SQ:1");

    let result = client.execute::<BrowseOperation>("127.0.0.1", &request);
    assert!(matches!(result, Err(ApiError::NetworkError(_))));
}

proptest! {
    #[test]
    fn prop_payload_values_survive_xml_parsing(value in "[a-zA-Z0-9<>&'\"/:?=_.-]{0,40}") {
        let mut xml = String::from("<Args>");
        push_element(&mut xml, "EnqueuedURIMetaData", &value);
        xml.push_str("</Args>");

        let parsed = xmltree::Element::parse(xml.as_bytes()).unwrap();
        let text = parsed
            .get_child("EnqueuedURIMetaData")
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned())
            .unwrap_or_default();
        prop_assert_eq!(text, value);
    }
}
