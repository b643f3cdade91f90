use crate::analysis::Metric;

pub const MAIN_MENU: &str = "\
MAIN MENU
0 Exit
1 CRUD operations
2 Show top ten companies by criteria";

pub const CRUD_MENU: &str = "\
CRUD MENU
0 Back
1 Create a company
2 Read a company
3 Update a company
4 Delete a company
5 List all companies";

pub const TOP_TEN_MENU: &str = "\
TOP TEN MENU
0 Back
1 List by ND/EBITDA
2 List by ROE
3 List by ROA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainOption {
    Exit,
    Crud,
    TopTen,
}

impl MainOption {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "0" => Some(MainOption::Exit),
            "1" => Some(MainOption::Crud),
            "2" => Some(MainOption::TopTen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOption {
    Back,
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl CrudOption {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "0" => Some(CrudOption::Back),
            "1" => Some(CrudOption::Create),
            "2" => Some(CrudOption::Read),
            "3" => Some(CrudOption::Update),
            "4" => Some(CrudOption::Delete),
            "5" => Some(CrudOption::List),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopTenOption {
    Back,
    Rank(Metric),
}

impl TopTenOption {
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim() == "0" {
            return Some(TopTenOption::Back);
        }
        Metric::from_menu_key(input).ok().map(TopTenOption::Rank)
    }
}

/// Format a figure the way the reports show it: `None` when undefined,
/// whole numbers keep one decimal
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => "None".to_string(),
        Some(v) if v.fract() == 0.0 => format!("{:.1}", v),
        Some(v) => format!("{}", v),
    }
}

/// "net_profit" -> "net profit"
pub fn field_label(field: &str) -> String {
    field.replace('_', " ")
}
