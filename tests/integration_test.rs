use clap::Parser;
use pretty_assertions::assert_eq;
use wsdl_from_source::{
    cli::{self, CliArgs},
    config::{BindingStyleUpdate, Style},
    discovery::AutoDiscover,
    environment::StaticContext,
    reflection::{manifest::ManifestReflector, source::SourceReflector, Reflector},
    strategy::ArrayOfTypeSequence,
};
use tempfile::TempDir;

const URI: &str = "http://localhost/soap/customers";

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn discover_with_style(style: Style) -> AutoDiscover {
    let mut discover = AutoDiscover::new()
        .with_context(Box::new(StaticContext::new("localhost", "/customers.php")));
    discover.set_uri(URI).expect("valid uri");
    discover.set_complex_type_strategy(Box::new(ArrayOfTypeSequence));
    discover
        .set_binding_style(&BindingStyleUpdate {
            style: Some(style),
            transport: None,
        })
        .expect("no document yet");
    discover
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_source_class_end_to_end_document_style() {
    let code = include_str!("fixtures/customer_service.rs");
    let temp_dir = create_test_project(vec![("src/service.rs", code)]);

    let reflector = SourceReflector::from_directory(temp_dir.path()).expect("Failed to reflect");
    let mut discover = discover_with_style(Style::Document);
    discover
        .set_class(&reflector, "CustomerService")
        .expect("Failed to register class");

    assert_eq!(discover.functions(), &["get_list", "find", "forget"]);

    let xml = discover.to_xml().unwrap();

    // Nested arrays are emitted once each
    assert_eq!(count(&xml, "<xsd:complexType name=\"ArrayOfCustomer\">"), 1);
    assert_eq!(count(&xml, "<xsd:complexType name=\"ArrayOfArrayOfCustomer\">"), 1);
    assert_eq!(count(&xml, "<xsd:complexType name=\"Customer\">"), 1);

    // Record fields honour serde attributes
    assert!(xml.contains("<xsd:element name=\"fullName\" type=\"xsd:string\"/>"));
    assert!(xml.contains("<xsd:element name=\"email\" type=\"xsd:string\" nillable=\"true\"/>"));
    assert!(xml.contains("<xsd:element name=\"tier\" type=\"tns:Tier\"/>"));
    assert!(!xml.contains("password_hash"));
    assert!(xml.contains("<xsd:enumeration value=\"Gold\"/>"));

    // Wrapper elements
    assert!(xml.contains("<xsd:element name=\"customers\" type=\"tns:ArrayOfCustomer\"/>"));
    assert!(xml.contains(
        "<xsd:element name=\"get_listResult\" type=\"tns:ArrayOfArrayOfCustomer\"/>"
    ));
    assert!(xml.contains("<xsd:element name=\"limit\" type=\"xsd:unsignedInt\" nillable=\"true\"/>"));
    assert!(xml.contains("<part name=\"parameters\" element=\"tns:get_list\"/>"));
    assert!(xml.contains("<part name=\"parameters\" element=\"tns:get_listResponse\"/>"));

    // One-way operation
    assert!(xml.contains("<message name=\"forgetIn\">"));
    assert!(!xml.contains("forgetOut"));

    // Private methods are not operations
    assert!(!xml.contains("audit"));

    // Descriptions become documentation
    assert!(xml.contains("<documentation>Group the given customers by tier.</documentation>"));
    assert!(xml.contains("<documentation>Find customers whose name matches.</documentation>"));

    // Binding, service and ordering
    assert!(xml.contains("<soap:binding style=\"document\" transport=\"http://schemas.xmlsoap.org/soap/http\"/>"));
    assert!(xml.contains("<soap:operation soapAction=\"http://localhost/soap/customers#find\"/>"));
    assert!(xml.contains("<service name=\"CustomerServiceService\">"));
    let types_pos = xml.find("<types>").unwrap();
    let port_pos = xml.find("<portType").unwrap();
    assert!(types_pos < port_pos);
}

#[test]
fn test_source_functions_rpc_style() {
    let code = include_str!("fixtures/customer_service.rs");
    let temp_dir = create_test_project(vec![("src/lib.rs", code)]);

    let reflector = SourceReflector::from_directory(temp_dir.path()).unwrap();
    let mut discover = discover_with_style(Style::Rpc);
    discover.add_functions(&reflector, &["add", "ping"]).unwrap();

    let xml = discover.to_xml().unwrap();
    assert!(xml.contains("<definitions "));
    assert!(xml.contains("name=\"customers\""));
    assert!(xml.contains("<part name=\"a\" type=\"xsd:int\"/>"));
    assert!(xml.contains("<part name=\"b\" type=\"xsd:int\"/>"));
    assert!(xml.contains("<part name=\"return\" type=\"xsd:int\"/>"));
    assert!(xml.contains("<message name=\"pingIn\"/>"));
    assert!(!xml.contains("pingOut"));
    assert!(xml.contains("<operation name=\"ping\">\n      <input message=\"tns:pingIn\"/>\n    </operation>"));
    assert!(!xml.contains("<part name=\"parameters\""));
    assert!(xml.contains("namespace=\"http://localhost/soap/customers\""));
}

#[test]
fn test_types_split_across_files() {
    let temp_dir = create_test_project(vec![
        (
            "src/models.rs",
            r#"
            pub struct Invoice { pub number: String, pub lines: Vec<Line> }
            pub struct Line { pub amount: f64 }
            "#,
        ),
        (
            "src/service.rs",
            r#"
            use crate::models::Invoice;
            pub struct Billing;
            impl Billing {
                pub fn open(&self) -> Vec<crate::models::Invoice> { Vec::new() }
            }
            "#,
        ),
    ]);

    let reflector = SourceReflector::from_directory(temp_dir.path()).unwrap();
    assert_eq!(reflector.catalog().len(), 3);

    let mut discover = discover_with_style(Style::Rpc);
    discover.set_class(&reflector, "Billing").unwrap();

    let xml = discover.to_xml().unwrap();
    assert!(xml.contains("<xsd:complexType name=\"ArrayOfModels.Invoice\">"));
    assert!(xml.contains("<xsd:complexType name=\"models.Invoice\">"));
    assert!(xml.contains("<xsd:element name=\"lines\" type=\"tns:ArrayOfLine\"/>"));
    assert!(xml.contains("<xsd:element name=\"amount\" type=\"xsd:double\"/>"));
}

#[test]
fn test_manifest_through_cli() {
    let manifest = include_str!("fixtures/calculator.yaml");
    let temp_dir = create_test_project(vec![("calculator.yaml", manifest)]);
    let input = temp_dir.path().join("calculator.yaml");
    let output = temp_dir.path().join("out").join("calculator.wsdl");

    let args = CliArgs::try_parse_from([
        "wsdl-from-source",
        input.to_str().unwrap(),
        "-u",
        "http://localhost/calc",
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let args = cli::parse_args_from_parsed(args).unwrap();
    cli::run(args).unwrap();

    let xml = std::fs::read_to_string(&output).unwrap();
    assert!(xml.contains("<portType name=\"calculatorPort\">"));
    assert!(xml.contains("<documentation>Add two integers</documentation>"));
    // The prototype with the optional start parameter has the most parameters
    assert!(xml.contains("<part name=\"values\" type=\"soap-enc:Array\"/>"));
    assert!(xml.contains("<part name=\"start\" type=\"xsd:int\"/>"));
    assert!(xml.contains("<message name=\"resetIn\"/>"));
    assert!(!xml.contains("resetOut"));
    assert!(xml.contains("<soap:operation soapAction=\"http://localhost/calc#sum\"/>"));
}

#[test]
fn test_manifest_reflector_with_engine() {
    let manifest = include_str!("fixtures/calculator.yaml");
    let temp_dir = create_test_project(vec![("calculator.yaml", manifest)]);
    let reflector = ManifestReflector::load(&temp_dir.path().join("calculator.yaml")).unwrap();

    let mut discover = discover_with_style(Style::Document);
    discover.set_name("calculator");
    discover
        .add_functions(&reflector, &["sum", "reset"])
        .unwrap();

    let xml = discover.to_xml().unwrap();
    assert!(xml.contains("<xsd:element name=\"values\" type=\"tns:ArrayOfInt\"/>"));
    assert!(xml.contains("<xsd:element name=\"start\" type=\"xsd:int\" nillable=\"true\"/>"));
    assert!(xml.contains("<xsd:element name=\"sumResult\" type=\"xsd:int\"/>"));
    assert!(xml.contains("<xsd:element name=\"reset\">"));
    assert!(!xml.contains("resetResponse"));
}

#[test]
fn test_missing_class_fails_without_document() {
    let temp_dir = create_test_project(vec![("src/lib.rs", "pub fn ping() {}")]);
    let reflector = SourceReflector::from_directory(temp_dir.path()).unwrap();

    let mut discover = discover_with_style(Style::Rpc);
    assert!(discover.set_class(&reflector, "Nope").is_err());
    assert!(discover.wsdl().is_none());
    assert!(discover.to_xml().is_err());
}
