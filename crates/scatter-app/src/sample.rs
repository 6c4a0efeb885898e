//! Bundled sample input for the standalone app

/// Regional sales vs. profit for two years, sized by units sold
pub const DATA_VIEW: &str = r##"{
    "categories": [
        {
            "source": { "display_name": "Region", "roles": ["Category"], "value_type": "text" },
            "values": ["North", "South", "East", "West", "Central", "Coastal Islands"]
        }
    ],
    "series": { "display_name": "Year", "roles": ["Series"], "value_type": "numeric" },
    "groups": [
        {
            "name": 2024,
            "columns": [
                { "source": { "display_name": "Sales", "roles": ["X"] },
                  "values": [182000, 240500, 96000, 310250, 150000, 64000] },
                { "source": { "display_name": "Profit", "roles": ["Y"] },
                  "values": [21000, 33800, 8100, 45900, 17250, 4300] },
                { "source": { "display_name": "Units", "roles": ["Size"] },
                  "values": [1200, 1650, 700, 2100, 980, 410] }
            ]
        },
        {
            "name": 2025,
            "columns": [
                { "source": { "display_name": "Sales", "roles": ["X"] },
                  "values": [201000, 228000, 121500, 335000, null, 71900] },
                { "source": { "display_name": "Profit", "roles": ["Y"] },
                  "values": [24800, 30100, 11900, 51200, 18800, 5600] },
                { "source": { "display_name": "Units", "roles": ["Size"] },
                  "values": [1320, 1580, 860, 2290, 1010, 455] }
            ]
        }
    ]
}"##;

/// Formatting options; units in thousands on both axes
pub const SETTINGS: &str = r##"{
    "data_point": { "fill_point": true, "outline": true },
    "category_axis": { "display_units": "thousands", "title": "Sales" },
    "value_axis": { "display_units": "thousands", "precision": 1, "title": "Profit" },
    "legend": { "show": true, "show_title": true },
    "category_labels": { "show": true },
    "crosshair": { "show": true }
}"##;
