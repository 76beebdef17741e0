//! Static keyword documentation and the attribute lists allowed per block.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::context::BlockKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCategory {
    /// Top-level declaration (`task`, `resource`, `macro`, ...).
    Property,
    Attribute,
    Report,
    Column,
    Function,
}

impl KeywordCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordCategory::Property => "property",
            KeywordCategory::Attribute => "attribute",
            KeywordCategory::Report => "report",
            KeywordCategory::Column => "column",
            KeywordCategory::Function => "function",
        }
    }
}

impl fmt::Display for KeywordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordInfo {
    pub name: &'static str,
    pub category: KeywordCategory,
    pub description: &'static str,
    pub syntax: Option<&'static str>,
}

use KeywordCategory::*;

#[rustfmt::skip]
const ENTRIES: &[(&str, KeywordCategory, &str, Option<&str>)] = &[
    ("project", Property, "Defines the root element of a project. All other properties are defined within the project scope.", Some("project <id> \"<name>\" <start_date> <duration|end_date> { ... }")),
    ("task", Property, "Defines a task in the project. Tasks can be nested to create a work breakdown structure.", Some("task <id> \"<name>\" { ... }")),
    ("resource", Property, "Defines a resource that can be allocated to tasks.", Some("resource <id> \"<name>\" { ... }")),
    ("account", Property, "Defines an account for financial tracking and cost/revenue reporting.", Some("account <id> \"<name>\" { ... }")),
    ("shift", Property, "Defines a work shift pattern with specific working hours.", Some("shift <id> \"<name>\" { ... }")),
    ("scenario", Property, "Defines a scenario for what-if analysis. Scenarios can inherit from other scenarios.", Some("scenario <id> \"<name>\" { ... }")),
    ("macro", Property, "Defines a reusable text macro that can be referenced using ${macro_name}.", Some("macro <name> [ <text> ]")),
    ("include", Property, "Includes another TaskJuggler file (.tji).", Some("include \"<file.tji>\"")),
    ("export", Property, "Exports project data to various formats.", Some("export <format> \"<filename>\"")),
    ("supplement", Property, "Supplements/extends an existing task or resource definition.", Some("supplement <type> <id> { ... }")),
    ("extend", Property, "Extends the TaskJuggler syntax with custom attributes.", Some("extend <property> { ... }")),
    ("flags", Property, "Declares global flags that can be used for filtering.", Some("flags <flag_name> [, ...]")),
    ("copyright", Attribute, "Specifies copyright information for the project.", Some("copyright \"<text>\"")),
    ("currency", Attribute, "Sets the currency symbol for the project.", Some("currency \"<symbol>\"")),
    ("trackingscenario", Attribute, "Specifies the scenario used for tracking actual progress.", Some("trackingscenario <scenario_id>")),
    ("taskreport", Report, "Generates a report listing tasks and their properties.", Some("taskreport <id> \"<name>\" { ... }")),
    ("resourcereport", Report, "Generates a report listing resources and their allocations.", Some("resourcereport <id> \"<name>\" { ... }")),
    ("accountreport", Report, "Generates a financial account report.", Some("accountreport <id> \"<name>\" { ... }")),
    ("textreport", Report, "Generates a text-based report with custom formatting.", Some("textreport <id> \"<name>\" { ... }")),
    ("timesheetreport", Report, "Generates a timesheet report for resources.", Some("timesheetreport <id> \"<name>\" { ... }")),
    ("statussheetreport", Report, "Generates a status sheet report.", Some("statussheetreport <id> \"<name>\" { ... }")),
    ("tracereport", Report, "Generates a detailed trace report for debugging.", Some("tracereport <id> \"<name>\" { ... }")),
    ("icalreport", Report, "Generates an iCalendar format export.", Some("icalreport <id> \"<name>\" { ... }")),
    ("nikureport", Report, "Generates a Niku (Clarity) compatible export.", Some("nikureport <id> \"<name>\" { ... }")),
    ("xmlreport", Report, "Generates an XML format report.", Some("xmlreport <id> \"<name>\" { ... }")),
    ("navigator", Report, "Generates a navigation bar for HTML reports.", Some("navigator <id> { ... }")),
    ("allocate", Attribute, "Allocates one or more resources to a task.", Some("allocate <resource_id> [, <resource_id>, ...]")),
    ("alternative", Attribute, "Provides alternative resource allocations.", Some("alternative <resource_id> [, ...]")),
    ("chargeset", Attribute, "Defines a set of charges for cost distribution.", Some("chargeset <id> { ... }")),
    ("charge", Attribute, "Assigns a charge to an account.", Some("charge <amount> [<account_id>]")),
    ("complete", Attribute, "Specifies the completion percentage of a task.", Some("complete <percentage>")),
    ("depends", Attribute, "Creates a dependency between tasks.", Some("depends <task_id> [{ <attributes> }]")),
    ("duration", Attribute, "Specifies the elapsed time for a task (calendar time).", Some("duration <duration>")),
    ("effort", Attribute, "Specifies the amount of work required (person-time).", Some("effort <duration>")),
    ("efficiency", Attribute, "Sets the efficiency factor for a resource (0.0 to unlimited).", Some("efficiency <factor>")),
    ("email", Attribute, "Specifies an email address for a resource.", Some("email \"<address>\"")),
    ("end", Attribute, "Fixes the end date of a task.", Some("end <date>")),
    ("fail", Attribute, "Causes the scheduling to fail with an error message.", Some("fail <condition> \"<message>\"")),
    ("gapduration", Attribute, "Specifies minimum gap between dependent tasks.", Some("gapduration <duration>")),
    ("gaplength", Attribute, "Specifies minimum working time gap between tasks.", Some("gaplength <duration>")),
    ("length", Attribute, "Specifies the working time duration of a task.", Some("length <duration>")),
    ("limits", Attribute, "Sets resource allocation limits.", Some("limits { dailymax <duration> }")),
    ("dailymax", Attribute, "Maximum daily resource allocation.", Some("dailymax <duration>")),
    ("dailymin", Attribute, "Minimum daily resource allocation.", Some("dailymin <duration>")),
    ("weeklymax", Attribute, "Maximum weekly resource allocation.", Some("weeklymax <duration>")),
    ("weeklymin", Attribute, "Minimum weekly resource allocation.", Some("weeklymin <duration>")),
    ("monthlymax", Attribute, "Maximum monthly resource allocation.", Some("monthlymax <duration>")),
    ("managers", Attribute, "Assigns managers to a resource.", Some("managers <resource_id> [, ...]")),
    ("mandatory", Attribute, "Makes a resource allocation mandatory.", Some("mandatory")),
    ("maxend", Attribute, "Sets the maximum allowed end date for a task (attribute), or displays the maximum end date in a report column.", Some("maxend <date> | columns maxend")),
    ("maxstart", Attribute, "Sets the maximum allowed start date for a task (attribute), or displays the maximum start date in a report column.", Some("maxstart <date> | columns maxstart")),
    ("minend", Attribute, "Sets the minimum required end date for a task (attribute), or displays the minimum end date in a report column.", Some("minend <date> | columns minend")),
    ("minstart", Attribute, "Sets the minimum required start date for a task (attribute), or displays the minimum start date in a report column.", Some("minstart <date> | columns minstart")),
    ("milestone", Attribute, "Marks a task as a milestone (zero duration).", Some("milestone")),
    ("note", Attribute, "Adds a note to a task or resource.", Some("note \"<text>\"")),
    ("persistent", Attribute, "Makes a resource allocation persistent across scheduling passes.", Some("persistent")),
    ("priority", Attribute, "Sets the scheduling priority (0-1000, default 500).", Some("priority <number>")),
    ("projectid", Attribute, "Links a task to an external project ID.", Some("projectid \"<id>\"")),
    ("purge", Attribute, "Removes attributes from inherited scenarios.", Some("purge <attribute>")),
    ("rate", Attribute, "Defines the cost rate per day for a resource.", Some("rate <number>")),
    ("responsible", Attribute, "Assigns a responsible resource to a task.", Some("responsible <resource_id>")),
    ("scheduling", Attribute, "Sets the scheduling direction (asap or alap).", Some("scheduling <direction>")),
    ("asap", Attribute, "As Soon As Possible scheduling.", Some("scheduling asap")),
    ("alap", Attribute, "As Late As Possible scheduling.", Some("scheduling alap")),
    ("start", Attribute, "Fixes the start date of a task.", Some("start <date>")),
    ("vacation", Attribute, "Defines vacation periods for resources.", Some("vacation <start_date> [+<duration>]")),
    ("leaves", Attribute, "Defines leave/vacation periods for a resource.", Some("leaves vacation <start_date> [+<duration>]")),
    ("workinghours", Attribute, "Defines working hours for a resource or globally.", Some("workinghours <day> <start>-<end>")),
    ("timezone", Attribute, "Sets the timezone for the project.", Some("timezone \"<timezone>\"")),
    ("booking", Attribute, "Books a resource for specific time periods.", Some("booking <resource_id> <start_date> [+<duration>]")),
    ("formats", Attribute, "Specifies output formats for reports.", Some("formats <format> [, ...]")),
    ("html", Attribute, "HTML output format.", Some("formats html")),
    ("csv", Attribute, "CSV output format.", Some("formats csv")),
    ("xml", Attribute, "XML output format.", Some("formats xml")),
    ("msp", Attribute, "Microsoft Project XML format.", Some("formats msp")),
    ("tjp", Attribute, "TaskJuggler project format.", Some("formats tjp")),
    ("columns", Attribute, "Defines which columns to display in a report.", Some("columns <column_id> [, ...]")),
    ("loadunit", Attribute, "Specifies the unit for displaying resource load.", Some("loadunit <unit>")),
    ("hours", Attribute, "Hours time unit.", Some("loadunit hours")),
    ("days", Attribute, "Days time unit.", Some("loadunit days")),
    ("weeks", Attribute, "Weeks time unit.", Some("loadunit weeks")),
    ("months", Attribute, "Months time unit.", Some("loadunit months")),
    ("years", Attribute, "Years time unit.", Some("loadunit years")),
    ("caption", Attribute, "Adds a caption to a report.", Some("caption \"<text>\"")),
    ("center", Attribute, "Centers text in a text report.", Some("center \"<text>\"")),
    ("headline", Attribute, "Sets the headline for a report.", Some("headline \"<text>\"")),
    ("period", Attribute, "Defines the time period for a report.", Some("period <start_date> - <end_date>")),
    ("timeformat", Attribute, "Sets the time format for date displays.", Some("timeformat \"<format>\"")),
    ("currencyformat", Attribute, "Sets the format for currency displays.", Some("currencyformat \"<prefix>\" \"<suffix>\" \"<sep>\" \"<fracsep>\" <digits>")),
    ("numberformat", Attribute, "Sets the format for number displays.", Some("numberformat \"<prefix>\" \"<suffix>\" \"<sep>\" \"<fracsep>\" <digits>")),
    ("select", Attribute, "Filters tasks or resources in reports using logical expressions.", Some("select <expression>")),
    ("hidetask", Attribute, "Hides tasks matching criteria from reports.", Some("hidetask <expression>")),
    ("hideresource", Attribute, "Hides resources matching criteria from reports.", Some("hideresource <expression>")),
    ("hideaccount", Attribute, "Hides accounts matching criteria from reports.", Some("hideaccount <expression>")),
    ("hidejournalentry", Attribute, "Hides journal entries matching criteria.", Some("hidejournalentry <expression>")),
    ("sorttasks", Attribute, "Defines how to sort tasks in reports.", Some("sorttasks <criteria>")),
    ("sortresources", Attribute, "Defines how to sort resources in reports.", Some("sortresources <criteria>")),
    ("sortaccounts", Attribute, "Defines how to sort accounts in reports.", Some("sortaccounts <criteria>")),
    ("rollupresource", Attribute, "Rolls up resource data to parent level.", Some("rollupresource <expression>")),
    ("rolluptask", Attribute, "Rolls up task data to parent level.", Some("rolluptask <expression>")),
    ("rollupaccount", Attribute, "Rolls up account data to parent level.", Some("rollupaccount <expression>")),
    ("taskroot", Attribute, "Sets the root task for a report.", Some("taskroot <task_id>")),
    ("resourceroot", Attribute, "Sets the root resource for a report.", Some("resourceroot <resource_id>")),
    ("bsi", Column, "Work Breakdown Structure index column.", Some("columns bsi { title \"WBS\" }")),
    ("name", Column, "Name column.", Some("columns name")),
    ("chart", Column, "Gantt chart column.", Some("columns chart { scale <unit> }")),
    ("id", Column, "ID column.", Some("columns id")),
    ("index", Column, "Index number column.", Some("columns index")),
    ("no", Column, "Number column.", Some("columns no")),
    ("hierarchindex", Column, "Hierarchical index column.", Some("columns hierarchindex")),
    ("seqno", Column, "Sequence number column.", Some("columns seqno")),
    ("status", Column, "Status column.", Some("columns status")),
    ("statusnote", Column, "Status note column.", Some("columns statusnote")),
    ("cost", Column, "Cost column.", Some("columns cost")),
    ("revenue", Column, "Revenue column.", Some("columns revenue")),
    ("profit", Column, "Profit column.", Some("columns profit")),
    ("isleaf", Function, "Returns true if the entity has no children.", Some("isleaf([<level>])")),
    ("istask", Function, "Returns true if the entity is a task.", Some("istask([<level>])")),
    ("ismilestone", Function, "Returns true if the task is a milestone.", Some("ismilestone([<level>])")),
    ("isresource", Function, "Returns true if the entity is a resource.", Some("isresource()")),
    ("isaccount", Function, "Returns true if the entity is an account.", Some("isaccount()")),
    ("isactive", Function, "Returns true if the task is active in the given scenario.", Some("isactive([<level>], [<scenario>])")),
    ("isongoing", Function, "Returns true if the task is ongoing at reference date.", Some("isongoing([<level>], [<date>])")),
    ("hasalert", Function, "Returns true if the task has alerts.", Some("hasalert([<level>])")),
    ("isdutyof", Function, "Returns true if the resource is responsible for the task.", Some("isdutyof(<resource_id>)")),
    ("isallocated", Function, "Returns true if a resource is allocated.", Some("isallocated([<level>], <resource_id>)")),
    ("ischildof", Function, "Returns true if the entity is a child of the specified parent.", Some("ischildof(<id>)")),
    ("treelevel", Function, "Returns the nesting level in the tree structure.", Some("treelevel()")),
    ("hasresource", Function, "Returns true if the task has resource allocations.", Some("hasresource([<level>])")),
    ("contains", Function, "Returns true if a string contains a substring.", Some("contains(\"<string>\", \"<substring>\")")),
    ("containssubstring", Function, "Alias for contains function.", Some("containssubstring(\"<string>\", \"<substring>\")")),
    ("journalentry", Attribute, "Adds a journal entry to document progress.", Some("journalentry <date> \"<headline>\" { ... }")),
    ("author", Attribute, "Specifies the author of a journal entry.", Some("author \"<name>\"")),
    ("summary", Attribute, "Provides a summary text.", Some("summary \"<text>\"")),
    ("details", Attribute, "Provides detailed text.", Some("details \"<text>\"")),
    ("alert", Attribute, "Defines an alert for the journal entry.", Some("alert <level>")),
    ("alertlevel", Attribute, "Defines custom alert levels.", Some("alertlevel <id> \"<name>\" { color <color> }")),
    ("red", Attribute, "Red alert level.", Some("alert red")),
    ("yellow", Attribute, "Yellow alert level.", Some("alert yellow")),
    ("green", Attribute, "Green alert level.", Some("alert green")),
    ("projectstart", Attribute, "Built-in macro for project start date.", Some("${projectstart}")),
    ("projectend", Attribute, "Built-in macro for project end date.", Some("${projectend}")),
    ("now", Attribute, "Built-in macro for current date/time.", Some("${now}")),
    ("today", Attribute, "Built-in macro for today's date.", Some("${today}")),
    ("mon", Attribute, "Monday.", Some("workinghours mon <hours>")),
    ("tue", Attribute, "Tuesday.", Some("workinghours tue <hours>")),
    ("wed", Attribute, "Wednesday.", Some("workinghours wed <hours>")),
    ("thu", Attribute, "Thursday.", Some("workinghours thu <hours>")),
    ("fri", Attribute, "Friday.", Some("workinghours fri <hours>")),
    ("sat", Attribute, "Saturday.", Some("workinghours sat <hours>")),
    ("sun", Attribute, "Sunday.", Some("workinghours sun <hours>")),
    ("off", Attribute, "Marks a day as non-working.", Some("workinghours <day> off")),
    ("tree", Attribute, "Tree sorting order.", Some("sorttasks tree")),
    ("up", Attribute, "Ascending sort order.", Some("sorttasks <field>.up")),
    ("down", Attribute, "Descending sort order.", Some("sorttasks <field>.down")),
    ("and", Function, "Logical AND operator.", Some("<expr1> & <expr2>")),
    ("or", Function, "Logical OR operator.", Some("<expr1> | <expr2>")),
    ("not", Function, "Logical NOT operator.", Some("~<expr>")),
    ("minute", Attribute, "Minute scale unit.", Some("scale minute")),
    ("hour", Attribute, "Hour scale unit.", Some("scale hour")),
    ("day", Attribute, "Day scale unit.", Some("scale day")),
    ("week", Attribute, "Week scale unit.", Some("scale week")),
    ("month", Attribute, "Month scale unit.", Some("scale month")),
    ("quarter", Attribute, "Quarter scale unit.", Some("scale quarter")),
    ("year", Attribute, "Year scale unit.", Some("scale year")),
    ("title", Attribute, "Sets the title for a column or element.", Some("title \"<text>\"")),
    ("width", Attribute, "Sets the width for a column or chart.", Some("width <pixels>")),
    ("scale", Attribute, "Sets the time scale for a chart.", Some("scale <unit>")),
    ("balance", Attribute, "Computes balance for an account.", Some("balance <account_id>")),
    ("aggregate", Attribute, "Specifies aggregation for values.", Some("aggregate <method>")),
    ("color", Attribute, "Sets color for an element.", Some("color \"<color>\"")),
    ("fontcolor", Attribute, "Sets font color.", Some("fontcolor \"<color>\"")),
    ("cellcolor", Attribute, "Sets cell background color.", Some("cellcolor <plan> \"<color>\"")),
    ("celltext", Attribute, "Sets cell text content.", Some("celltext <plan> \"<text>\"")),
    ("halign", Attribute, "Sets horizontal alignment.", Some("halign <alignment>")),
    ("left", Attribute, "Left alignment.", Some("halign left")),
    ("right", Attribute, "Right alignment.", Some("halign right")),
    ("listtype", Attribute, "Sets list formatting type.", Some("listtype <type>")),
    ("bullets", Attribute, "Bullet list type.", Some("listtype bullets")),
    ("numbered", Attribute, "Numbered list type.", Some("listtype numbered")),
    ("comma", Attribute, "Comma-separated list type.", Some("listtype comma")),
    ("tooltip", Attribute, "Sets tooltip text.", Some("tooltip \"<text>\"")),
    ("precedes", Attribute, "Defines which tasks this task precedes.", Some("precedes <task_id> [, ...]")),
    ("follows", Attribute, "Defines which tasks this task follows.", Some("follows <task_id> [, ...]")),
    ("inherit", Attribute, "Inherits attributes from parent.", Some("inherit <attribute>")),
];

static KEYWORDS: Lazy<HashMap<&'static str, KeywordInfo>> = Lazy::new(|| {
    ENTRIES
        .iter()
        .map(|&(name, category, description, syntax)| {
            (
                name,
                KeywordInfo {
                    name,
                    category,
                    description,
                    syntax,
                },
            )
        })
        .collect()
});

const PROJECT_ATTRIBUTES: &[&str] = &[
    "timezone", "currency", "currencyformat", "numberformat", "timeformat", "workinghours", "scenario",
    "trackingscenario", "copyright", "extend", "now", "loadunit", "alertlevel", "journalentry",
];

const TASK_ATTRIBUTES: &[&str] = &[
    "task", "effort", "duration", "length", "milestone", "allocate", "depends", "precedes", "follows", "start",
    "end", "minstart", "maxstart", "minend", "maxend", "priority", "complete", "responsible", "managers",
    "chargeset", "charge", "note", "scheduling", "projectid", "limits", "journalentry", "purge", "booking",
    "flags", "shifts",
];

const RESOURCE_ATTRIBUTES: &[&str] = &[
    "resource", "email", "rate", "efficiency", "limits", "vacation", "leaves", "workinghours", "managers",
    "booking", "flags", "shifts", "timezone", "journalentry", "purge", "chargeset",
];

const ACCOUNT_ATTRIBUTES: &[&str] = &["account", "aggregate", "credits", "flags", "purge"];

const REPORT_ATTRIBUTES: &[&str] = &[
    "formats", "columns", "headline", "caption", "center", "period", "start", "end", "timeformat",
    "currencyformat", "numberformat", "loadunit", "hidetask", "hideresource", "hideaccount",
    "hidejournalentry", "sorttasks", "sortresources", "sortaccounts", "rollupresource", "rolluptask",
    "rollupaccount", "taskroot", "resourceroot", "scenarios", "title", "balance",
];

/// Documentation entry for `name`.
pub fn keyword(name: &str) -> Option<&'static KeywordInfo> {
    KEYWORDS.get(name)
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains_key(name)
}

/// Attributes that may appear directly inside a block of `kind`.
pub fn block_attributes(kind: BlockKind) -> &'static [&'static str] {
    match kind {
        BlockKind::Project => PROJECT_ATTRIBUTES,
        BlockKind::Task => TASK_ATTRIBUTES,
        BlockKind::Resource => RESOURCE_ATTRIBUTES,
        BlockKind::Account => ACCOUNT_ATTRIBUTES,
        BlockKind::Report => REPORT_ATTRIBUTES,
        BlockKind::None => &[],
    }
}

/// Declarations allowed outside any block, in table order.
pub fn top_level_properties() -> impl Iterator<Item = &'static KeywordInfo> {
    ENTRIES
        .iter()
        .filter(|(_, category, _, _)| matches!(category, Property | Report))
        .filter_map(|(name, _, _, _)| keyword(name))
}
