use std::io::Read;

use crate::contract::{self, CalculateRequest};
use crate::error::Result;

pub fn run(file: Option<&str>) -> Result<()> {
    let json = match file {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)?,
    };
    let request = CalculateRequest::from_json(&json)?;
    let response = contract::handle(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
