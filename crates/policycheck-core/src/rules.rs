//! The static contract rule catalog, in evaluation order.
use indexmap::IndexMap;

use crate::types::Rule;

const CATALOG: &[(&str, &str, &str, &[&str])] = &[
    (
        "liability_limitation",
        "Liability Limitation Clauses",
        "Contracts must include appropriate liability limitations and caps",
        &["liability", "limitation", "damages", "indemnification", "cap"],
    ),
    (
        "termination_rights",
        "Termination and Cure Period",
        "Clear termination rights with reasonable cure periods",
        &["termination", "cure period", "breach", "notice", "immediate termination"],
    ),
    (
        "confidentiality_obligations",
        "Confidentiality and Non-Disclosure",
        "Proper confidentiality protections for proprietary information",
        &["confidential", "non-disclosure", "proprietary", "trade secret", "confidentiality"],
    ),
    (
        "intellectual_property_rights",
        "Intellectual Property Ownership",
        "Clear IP ownership and licensing provisions",
        &["intellectual property", "patent", "copyright", "trademark", "license", "ownership"],
    ),
    (
        "payment_terms",
        "Payment Terms and Conditions",
        "Defined payment schedules and late payment penalties",
        &["payment", "fees", "invoice", "late payment", "interest", "billing"],
    ),
    (
        "data_protection_compliance",
        "Data Protection and Privacy Laws",
        "Compliance with GDPR, CCPA, and other privacy regulations",
        &["GDPR", "CCPA", "privacy", "personal data", "data protection", "encryption"],
    ),
    (
        "service_level_agreements",
        "Service Level Commitments",
        "Defined service levels with remedies for non-performance",
        &["service level", "SLA", "uptime", "availability", "performance", "remedies"],
    ),
    (
        "governing_law_jurisdiction",
        "Governing Law and Jurisdiction",
        "Clear governing law and dispute resolution mechanisms",
        &["governing law", "jurisdiction", "arbitration", "dispute resolution", "court"],
    ),
    (
        "insurance_requirements",
        "Insurance and Coverage Requirements",
        "Adequate insurance coverage with appropriate limits",
        &["insurance", "liability coverage", "professional liability", "cyber liability", "coverage"],
    ),
    (
        "regulatory_compliance",
        "Regulatory and Standards Compliance",
        "Compliance with industry regulations and standards",
        &["compliance", "regulation", "SOC 2", "HIPAA", "SOX", "PCI DSS", "ISO 27001"],
    ),
    (
        "force_majeure",
        "Force Majeure Provisions",
        "Protection against unforeseeable circumstances",
        &["force majeure", "unforeseeable", "act of god", "pandemic", "natural disaster"],
    ),
    (
        "assignment_restrictions",
        "Assignment and Transfer Rights",
        "Restrictions on assignment without consent",
        &["assignment", "transfer", "consent", "successor", "change of control"],
    ),
    (
        "audit_compliance_reporting",
        "Audit Rights and Reporting",
        "Audit rights and compliance reporting requirements",
        &["audit", "inspection", "records", "compliance report", "certification"],
    ),
    (
        "security_incident_response",
        "Security Incident Notification",
        "Timely notification of security incidents and breaches",
        &["security incident", "breach notification", "24 hours", "incident response"],
    ),
    (
        "survival_provisions",
        "Survival of Contract Terms",
        "Terms that survive contract termination",
        &["survival", "survive termination", "post-termination", "indefinitely"],
    ),
];

/// Rule ids keyed in catalog order.
pub type RuleCatalog = IndexMap<String, Rule>;

pub fn all_rules() -> RuleCatalog {
    CATALOG
        .iter()
        .map(|(id, title, description, keywords)| {
            let rule = Rule {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            };
            (rule.id.clone(), rule)
        })
        .collect()
}

pub fn rule(id: &str) -> Option<Rule> {
    all_rules().swap_remove(id)
}

/// Every keyword across the catalog, deduplicated and sorted.
pub fn all_keywords() -> Vec<String> {
    let mut keywords: Vec<String> = CATALOG.iter().flat_map(|(_, _, _, kws)| kws.iter().map(|k| k.to_string())).collect();
    keywords.sort();
    keywords.dedup();
    keywords
}
