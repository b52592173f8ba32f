use minijinja::{context, Value};
use serde::Serialize;

/// A founder of one of the sample companies.
#[derive(Serialize)]
pub struct Founder {
    pub name: &'static str,
}

/// A company in the sample data set.
#[derive(Serialize)]
pub struct Company {
    pub name: &'static str,
    pub founders: Vec<Founder>,
}

fn companies() -> Vec<Company> {
    vec![
        Company {
            name: "Apple",
            founders: vec![
                Founder { name: "Steve Jobs" },
                Founder {
                    name: "Steve Wozniak",
                },
            ],
        },
        Company {
            name: "Microsoft",
            founders: vec![
                Founder { name: "Bill Gates" },
                Founder { name: "Paul Allen" },
            ],
        },
    ]
}

/// The built-in sample context.
///
/// This is what makes a bare `jinjapad` invocation explorable: a small
/// nested structure with a `companies` sequence of objects that each
/// carry a `name` and a `founders` sequence.
pub fn context() -> Value {
    context! { companies => companies() }
}
