// Operations and types of one service spread over several files
use std::path::Path;
use wsdl_from_source::reflection::source::{ParsedFile, SourceReflector};
use wsdl_from_source::reflection::{Reflector, TypeDefinition};

#[test]
fn test_cross_file_class_reflection() {
    // File 1: Type definitions and the first impl block
    let orders_code = r#"
        pub struct Order {
            pub id: u64,
            pub items: Vec<String>,
        }

        pub struct OrderService;

        impl OrderService {
            /// Place a new order
            pub fn place(&self, items: Vec<String>) -> Order {
                unimplemented!()
            }
        }
    "#;

    // File 2: A second impl block and a trait impl
    let admin_code = r#"
        use crate::orders::{Order, OrderService};

        impl OrderService {
            pub fn cancel(&self, id: u64) {}
            pub(crate) fn purge(&self) {}
        }

        impl Auditable for OrderService {
            fn history(&self, id: u64) -> Vec<Vec<Order>> {
                Vec::new()
            }
        }
    "#;

    let parsed_files = vec![
        ParsedFile::from_source(Path::new("orders.rs"), orders_code).expect("Failed to parse orders"),
        ParsedFile::from_source(Path::new("admin.rs"), admin_code).expect("Failed to parse admin"),
    ];
    let reflector = SourceReflector::new(parsed_files);

    let operations = reflector
        .reflect_class("OrderService")
        .expect("Should find OrderService");
    let names: Vec<&str> = operations.iter().map(|op| op.name.as_str()).collect();
    assert_eq!(names, vec!["place", "cancel", "history"]);

    assert_eq!(operations[0].description, "Place a new order");
    assert_eq!(operations[0].prototypes[0].return_type, "Order");
    assert!(operations[1].prototypes[0].is_one_way());
    assert_eq!(operations[2].prototypes[0].return_type, "Order[][]");

    match reflector.catalog().get("Order") {
        Some(TypeDefinition::Record { fields }) => {
            assert_eq!(fields.len(), 2);
            assert_eq!(fields[1].type_name, "String[]");
        }
        other => panic!("Order should be a record, got {:?}", other),
    }
}
