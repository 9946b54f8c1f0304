pub mod app_user;
pub mod approval;
pub mod branch;
pub mod career_path;
pub mod company;
pub mod department;
pub mod employee;
pub mod employee_kpi;
pub mod employee_kpi_evolution;
pub mod evaluation_type;
pub mod kpi;
pub mod performance_review;
pub mod person;
pub mod role;
pub mod role_type;
pub mod team;
pub mod team_kpi;
pub mod team_kpi_evolution;
pub mod team_member;
pub mod user_role;
pub mod user_secret;
