use std::str::FromStr;

use reqbind::FromParam;
use reqbind::coerce::ParamKind;

#[derive(Debug, PartialEq, FromParam)]
pub enum Status {
    Open,
    Done,
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "done" => Ok(Status::Done),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}

#[derive(Debug, PartialEq, serde::Deserialize, FromParam)]
#[from_param(json)]
pub struct Range {
    pub from: u32,
    pub to: u32,
}

fn main() {
    assert_eq!(Status::kind(), ParamKind::Decoded);
    assert_eq!(Status::from_param("done").unwrap(), Status::Done);
    assert!(Status::from_param("closed").is_err());
    assert_eq!(
        Range::from_param(r#"{"from": 1, "to": 3}"#).unwrap(),
        Range { from: 1, to: 3 }
    );
}
