//! Shared career-history fixtures for generation tests.

/// Career history with exactly five roles.
pub const FIVE_ROLE_SOURCE: &str = "\
Jane Doe
Boston, MA | jane@example.com

Experience
Staff Software Engineer, Northwind Analytics, Boston, MA (2021 - Present)
  Led the migration of the billing platform to event sourcing.
Senior Software Engineer, Contoso Health, Cambridge, MA (2018 - 2021)
  Built HIPAA-compliant ingestion pipelines processing 2M records/day.
Software Engineer, Fabrikam Logistics, Providence, RI (2015 - 2018)
  Owned routing microservices.
Junior Developer, Tailspin Toys, Hartford, CT (2012 - 2015)
  Maintained the e-commerce storefront.
Engineering Intern, Litware Labs, Boston, MA (2011 - 2011)
  Wrote test automation.

Education
Northeastern University, B.S. Computer Science, 2012";

/// Role-extraction reply: the five real roles, one invented role, one duplicate.
pub const FIVE_ROLE_ANALYSIS: &str = "\
Here is every role I found:
ROLE: Staff Software Engineer | Northwind Analytics | 2021 - Present | Boston, MA
ROLE: Senior Software Engineer | Contoso Health | 2018 - 2021 | Cambridge, MA
ROLE: Software Engineer | Fabrikam Logistics | 2015 - 2018 | Providence, RI
ROLE: Junior Developer | Tailspin Toys | 2012 - 2015 | Hartford, CT
ROLE: Engineering Intern | Litware Labs | 2011 - 2011 | N/A
ROLE: Principal Architect | Globex Corporation | 2008 - 2011 | Springfield
ROLE: Staff Software Engineer | Northwind Analytics | 2021 - Present | Boston, MA
Total roles: 5";

/// Pass-1 draft that ran out of room after three roles.
pub const DRAFT_THREE_OF_FIVE: &str = "\
**Jane Doe**
Boston, MA | jane@example.com

**PROFESSIONAL SUMMARY**
Backend engineer with a decade of platform work.

**PROFESSIONAL EXPERIENCE**

**Staff Software Engineer** **2021 – Present**
*Northwind Analytics – Boston, MA*
● Led the migration of the billing platform to event sourcing

**Senior Software Engineer** **2018 – 2021**
*Contoso Health – Cambridge, MA*
● Built HIPAA-compliant ingestion pipelines processing 2M records/day

**Software Engineer** **2015 – 2018**
*Fabrikam Logistics – Providence, RI*
● Owned routing microservices

**EDUCATION**
*Northeastern University*
B.S. Computer Science, 2012

**TECHNICAL SKILLS**
Rust, Go, PostgreSQL

**ROLE VERIFICATION LIST**
1. Staff Software Engineer | Northwind Analytics | 2021 – Present | Position: 1st
2. Senior Software Engineer | Contoso Health | 2018 – 2021 | Position: 2nd
3. Software Engineer | Fabrikam Logistics | 2015 – 2018 | Position: 3rd
4. Junior Developer | Tailspin Toys | 2012 – 2015 | Position: 4th+
5. Engineering Intern | Litware Labs | 2011 – 2011 | Position: 4th+";

/// Pass-2 fragment for the remaining-roles strategy.
pub const REMAINING_ROLES_REPLY: &str = "\
**PROFESSIONAL EXPERIENCE**

**Junior Developer** **2012 – 2015**
*Tailspin Toys – Hartford, CT*
● Maintained the e-commerce storefront

**Engineering Intern** **2011 – 2011**
*Litware Labs – Boston, MA*
● Wrote test automation

**EDUCATION**
*Northeastern University*
B.S. Computer Science, 2012

**TECHNICAL SKILLS**
Rust, Go, PostgreSQL";

/// Pass-2 full merge: all five roles in one document.
pub const FULL_MERGE_REPLY: &str = "\
**Jane Doe**
Boston, MA | jane@example.com

**PROFESSIONAL SUMMARY**
Backend engineer with a decade of platform work.

**PROFESSIONAL EXPERIENCE**

**Staff Software Engineer** **2021 – Present**
*Northwind Analytics – Boston, MA*
● Led the migration of the billing platform to event sourcing

**Senior Software Engineer** **2018 – 2021**
*Contoso Health – Cambridge, MA*
● Built HIPAA-compliant ingestion pipelines processing 2M records/day

**Software Engineer** **2015 – 2018**
*Fabrikam Logistics – Providence, RI*
● Owned routing microservices

**Junior Developer** **2012 – 2015**
*Tailspin Toys – Hartford, CT*
● Maintained the e-commerce storefront

**Engineering Intern** **2011 – 2011**
*Litware Labs – Boston, MA*
● Wrote test automation

**EDUCATION**
*Northeastern University*
B.S. Computer Science, 2012

**TECHNICAL SKILLS**
Rust, Go, PostgreSQL";
