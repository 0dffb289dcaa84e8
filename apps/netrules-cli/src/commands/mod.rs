pub mod es_ranges;
pub mod match_ips;
pub mod sg_rules;
