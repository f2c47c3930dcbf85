// Customer service fixture - a SOAP-style service with records, enums and nested arrays
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Customer {
    pub id: u32,
    #[serde(rename = "fullName")]
    pub name: String,
    pub email: Option<String>,
    pub tier: Tier,
    #[serde(skip)]
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Tier {
    Gold,
    Silver,
    Bronze,
}

pub struct CustomerService {
    customers: Vec<Customer>,
}

impl CustomerService {
    /// Group the given customers by tier.
    pub fn get_list(&self, customers: Vec<Customer>) -> Vec<Vec<Customer>> {
        Vec::new()
    }

    /// Find customers whose name matches.
    ///
    /// The limit defaults to all matches.
    pub fn find(&self, name: &str, limit: Option<u32>) -> Result<Vec<Customer>, String> {
        Ok(Vec::new())
    }

    /// Forget a customer.
    pub fn forget(&mut self, id: u32) {}

    fn audit(&self) -> usize {
        self.customers.len()
    }
}

pub fn add(a: i32, b: i32) -> i32 {
    a + b
}

pub fn ping() {}
