//! Sample contracts written into an empty document directory.
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::traits::DocumentProvisioner;

const SOFTWARE_LICENSE: &str = r#"SOFTWARE LICENSE AGREEMENT

1. GRANT OF LICENSE AND RESTRICTIONS
Company hereby grants Licensee a non-exclusive, non-transferable license to use the Software.
Licensee shall not reverse engineer, decompile, or create derivative works.
No sublicensing rights are granted without express written consent.

2. DATA PROTECTION AND PRIVACY COMPLIANCE
All personal data collected must be encrypted using AES-256 encryption standards.
Data processing activities shall comply with GDPR, CCPA, and applicable privacy regulations.
Data subjects retain rights to access, rectification, and erasure of personal data.

3. SECURITY AND COMPLIANCE OBLIGATIONS
Security incident notifications required within twenty-four (24) hours.
Annual security assessments by certified third-party auditors are mandatory.
Compliance with SOC 2 Type II and ISO 27001 standards is required.

4. LIMITATION OF LIABILITY AND INDEMNIFICATION
Company's total liability is limited to fees paid in the twelve (12) months preceding a claim.
Neither party is liable for indirect, incidental, or consequential damages.
Each party indemnifies the other against third-party intellectual property claims.

5. TERM AND TERMINATION
Either party may terminate for material breach with a thirty (30) day cure period.
Immediate termination is permitted for insolvency or breach of confidentiality.

6. INTELLECTUAL PROPERTY
Company retains all right, title, and ownership of the Software, including patent, copyright, and trademark rights.

7. GOVERNING LAW
This Agreement is governed by the laws of the State of Delaware.
Disputes are resolved through binding arbitration before a court of competent jurisdiction.
"#;

const SERVICE_AGREEMENT: &str = r#"MASTER SERVICE AGREEMENT

1. SERVICE LEVEL COMMITMENTS
Provider guarantees 99.9% uptime availability for production services, measured monthly.
Service credits are the exclusive remedies for failure to meet the service level.
Performance reports are delivered to Customer within ten (10) days of month end.

2. FEES AND PAYMENT TERMS
Customer shall pay all fees within thirty (30) days of the invoice date.
Late payment accrues interest at one percent (1%) per month on the outstanding balance.
Billing disputes must be raised in writing before the payment due date.

3. CONFIDENTIALITY
Each party shall protect the other's confidential and proprietary information, including trade secret material.
The non-disclosure obligations in this section survive termination for five (5) years.

4. INSURANCE
Provider shall maintain professional liability insurance with coverage of not less than $2,000,000.
Provider shall maintain cyber liability coverage of not less than $5,000,000.

5. AUDIT RIGHTS
Customer may audit Provider's records once per year upon thirty (30) days notice.
Provider shall deliver an annual compliance report and current certification documents.
"#;

const DATA_PROCESSING_ADDENDUM: &str = r#"DATA PROCESSING ADDENDUM

1. SCOPE
This Addendum governs the processing of personal data by Processor on behalf of Controller.

2. SECURITY MEASURES
Processor shall apply encryption of personal data at rest and in transit.
Processor shall maintain an incident response plan and test it annually.
Processor shall provide breach notification to Controller without undue delay and within 24 hours of discovery.

3. SUBPROCESSORS AND TRANSFER
Processor shall not transfer personal data to a subprocessor without prior written consent of Controller.
Any assignment of this Addendum to a successor requires consent, including upon a change of control.

4. RETURN AND DELETION
Upon termination Processor shall return or delete all personal data.
Obligations regarding deletion survive termination of the Agreement.
"#;

const CONSULTING_AGREEMENT: &str = r#"CONSULTING AGREEMENT

1. SERVICES
Consultant shall provide advisory services described in each statement of work.

2. COMPENSATION
Client shall pay the hourly fees stated in the statement of work.

3. FORCE MAJEURE
Neither party is liable for delay caused by force majeure events, including an act of god, pandemic, or natural disaster, or other unforeseeable circumstances beyond its reasonable control.

4. TERMINATION
Either party may terminate this Agreement upon sixty (60) days written notice.
"#;

const SAMPLE_CONTRACTS: [(&str, &str); 4] = [
    ("software_license_agreement.txt", SOFTWARE_LICENSE),
    ("master_service_agreement.txt", SERVICE_AGREEMENT),
    ("data_processing_addendum.txt", DATA_PROCESSING_ADDENDUM),
    ("consulting_agreement.txt", CONSULTING_AGREEMENT),
];

/// Writes a small set of contract documents covering most catalog rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleContracts;

impl SampleContracts {
    pub fn file_names() -> impl Iterator<Item = &'static str> {
        SAMPLE_CONTRACTS.iter().map(|(name, _)| *name)
    }
}

impl DocumentProvisioner for SampleContracts {
    fn provision(&self, dir: &Path) -> Result<usize> {
        fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e))?;
        for (name, content) in SAMPLE_CONTRACTS {
            let path = dir.join(name);
            fs::write(&path, content).map_err(|e| Error::persistence(&path, e))?;
        }
        info!(dir = %dir.display(), count = SAMPLE_CONTRACTS.len(), "wrote sample contracts");
        Ok(SAMPLE_CONTRACTS.len())
    }
}
