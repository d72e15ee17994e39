/*!
# InsightXL

Excel analytics as a web service: upload a workbook, explore it as charts,
and ask an AI collaborator questions about it.

## Overview

InsightXL parses the first worksheet of an uploaded `.xlsx`/`.xls` file into
a tabular model, derives renderer-agnostic chart specifications from a pair
of user-chosen columns, and rasterizes them as 2D charts (bar, line, pie) or
an auto-rotating extruded 3D bar scene. A Hugging Face text-generation model
acts as the analysis collaborator; when it is unreachable or unconfigured, a
deterministic offline generator produces hedged analyses from the same
bounded dataset sample. Saved analyses are per-user records behind JWT
session tokens.

## Architecture

- **Tabular model**: first row becomes headers, every following row a
  header-to-cell mapping; short rows are padded so each mapping is total.
- **Chart pipeline**: table + axis/kind/palette selections →
  [`chart::ChartSpec`] → PNG via the 2D canvas path or the 3D scene path.
  Overlapping recomputations are sequenced so the newest result wins.
- **Insights**: a bounded prompt document (counts, headers, five sample
  rows, per-column profiles) is the collaborator's entire context; failures
  degrade to [`insight::fallback_response`].
- **Accounts and history**: JSON-file stores under the data directory,
  Argon2 password hashes, stateless HS256 session tokens, owner-scoped
  analysis records.

## Modules

- **table**: workbook parsing and the in-memory tabular model
- **profile**: per-column sample summaries for the stats sidebar
- **chart**: chart specification, palettes, numeric coercion, sequencing
- **render2d**: bar/line/pie rasterization and base64 PNG export
- **render3d**: the extruded 3D bar scene and its orbit camera
- **insight**: prompt construction, the AI client, the offline fallback
- **auth**: accounts, password hashing, session tokens
- **history**: saved analysis records
- **app**: routing and the token middleware
- **config**: environment-driven runtime configuration
- **error**: the application error taxonomy

## REST API Endpoints

- `POST /auth/signup`, `POST /auth/login`, `PUT /auth/update-profile`
- `POST /analysis/save`, `GET /analysis/history`, `DELETE /analysis/{id}`
- `POST /api/upload` - Parses a workbook and returns the tabular model
- `POST /api/chart` - Renders a chart specification as PNG
- `POST /api/chart/export` - Exports a 2D chart as a base64 data URL
- `POST /api/insights` - Runs an analysis question, with offline fallback
- `GET /api/insights/transcript` - Plain-text download of the session
*/

pub mod app;
pub mod auth;
pub mod chart;
pub mod config;
pub mod error;
pub mod history;
pub mod insight;
pub mod profile;
pub mod render2d;
pub mod render3d;
pub mod table;
