//! Declarative macro for UPnP operation definitions
//!
//! Each operation is declared once with its request arguments and response
//! values, each paired with the element name the device uses on the wire.
//! The macro generates the request and response structs and the
//! [`UPnPOperation`](crate::operation::UPnPOperation) implementation.

/// Define a UPnP operation with typed request and response
///
/// Request arguments are written into the payload in declaration order with
/// their values XML-escaped. Every response value is required; a missing
/// element fails the whole response.
///
/// A `Validate` implementation for the generated request type must be
/// provided next to the definition.
///
/// # Example
/// ```rust,ignore
/// define_operation_with_response! {
///     operation: DestroyObjectOperation,
///     action: "DestroyObject",
///     service: ContentDirectory,
///     request: {
///         object_id: String => "ObjectID",
///     },
///     response: DestroyObjectResponse {},
/// }
///
/// impl Validate for DestroyObjectOperationRequest {}
/// ```
#[macro_export]
macro_rules! define_operation_with_response {
    (
        operation: $op_struct:ident,
        action: $action:literal,
        service: $service:ident,
        request: {
            $($field:ident: $field_type:ty => $xml_name:literal),* $(,)?
        },
        response: $response_struct:ident {
            $($resp_field:ident: $resp_type:ty => $resp_xml:literal),* $(,)?
        } $(,)?
    ) => {
        paste! {
            #[derive(serde::Serialize, Clone, Debug, PartialEq)]
            pub struct [<$op_struct Request>] {
                $(pub $field: $field_type,)*
            }

            #[derive(serde::Deserialize, Debug, Clone, PartialEq)]
            pub struct $response_struct {
                $(pub $resp_field: $resp_type,)*
            }

            pub struct $op_struct;

            impl $crate::operation::UPnPOperation for $op_struct {
                type Request = [<$op_struct Request>];
                type Response = $response_struct;

                const SERVICE: $crate::service::Service = $crate::service::Service::$service;
                const ACTION: &'static str = $action;

                fn build_payload(request: &Self::Request) -> Result<String, $crate::operation::ValidationError> {
                    $crate::operation::Validate::validate(request, $crate::operation::ValidationLevel::Boundary)?;

                    #[allow(unused_mut)]
                    let mut xml = String::new();
                    $(
                        $crate::operation::push_element(&mut xml, $xml_name, &request.$field);
                    )*
                    Ok(xml)
                }

                #[allow(unused_variables)]
                fn parse_response(xml: &xmltree::Element) -> Result<Self::Response, $crate::error::ApiError> {
                    Ok($response_struct {
                        $($resp_field: $crate::operation::parse_child(xml, $resp_xml)?,)*
                    })
                }
            }
        }
    };
}
