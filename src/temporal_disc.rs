pub mod picard;
pub mod theta_scheme;
pub mod time_loop;
